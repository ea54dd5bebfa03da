//! HTTP page fetching with a browser request profile.
//!
//! Requests go out through wreq with Chrome emulation, so the TLS and HTTP/2
//! handshakes match a desktop Chrome build as well as the headers.

mod headers;

use std::future::Future;
use std::time::Duration;

use wreq::header::RETRY_AFTER;
use wreq::{Client, StatusCode};
use wreq_util::Emulation;

use crate::error::ScrapeError;
use crate::rate_limit::retry_with_backoff;

/// Chrome build whose TLS and HTTP/2 fingerprint every fetch reproduces.
pub const BROWSER_EMULATION: Emulation = Emulation::Chrome131;

/// Source of raw product-page HTML.
///
/// [`BrowserClient`] is the production implementation; tests substitute
/// in-memory fetchers.
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ScrapeError>> + Send;
}

/// HTTP client that presents itself as desktop Chrome.
///
/// Non-2xx responses are typed errors. Transient failures are retried with
/// exponential backoff up to `max_retries` additional attempts; every
/// attempt is bounded by the request timeout.
pub struct BrowserClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl BrowserClient {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `wreq::Client`
    /// cannot be constructed (e.g., invalid TLS config or user agent).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .emulation(BROWSER_EMULATION)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers::browser_headers())
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScrapeError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

impl PageFetcher for BrowserClient {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.fetch_once(url)).await
    }
}

/// Hostname of `url` for error messages, or the whole string if it does not
/// parse.
fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
