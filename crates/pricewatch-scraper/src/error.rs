use pricewatch_core::{CoreError, StoreError};
use thiserror::Error;

/// Failures of one work item: fetching, parsing, extracting, or handing off
/// a single product URL.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] wreq::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("could not parse document from {url}: {reason}")]
    ParseDocument { url: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("field not found: {0}")]
    FieldNotFound(&'static str),

    #[error("could not parse price from \"{raw}\": {reason}")]
    PriceParse { raw: String, reason: String },

    #[error("agent output does not match the required schema: {source}")]
    AgentSchema {
        #[source]
        source: serde_json::Error,
    },

    #[error("agent invocation failed: {0}")]
    AgentInvocation(#[from] AgentError),

    #[error("invalid record: {0}")]
    Record(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("worker panicked: {message}")]
    WorkerPanic { message: String },
}

impl ScrapeError {
    /// `true` for transport failures and non-2xx responses.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::Http(_)
                | ScrapeError::UnexpectedStatus { .. }
                | ScrapeError::RateLimited { .. }
        )
    }
}

/// Failures talking to the browsing agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no agent service is configured")]
    NotConfigured,

    #[error("agent transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent service returned status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("agent did not finish within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("agent reported an error: {0}")]
    Agent(String),

    #[error("malformed agent service response: {0}")]
    Protocol(String),
}
