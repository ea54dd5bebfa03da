//! Fallback extraction through an external browsing agent.
//!
//! Only used for URLs whose source key has no registered adapter. The agent
//! itself is a black box behind [`AgentClient`]; [`FallbackStrategy`] owns
//! the session lifecycle, the timeout, and decoding the agent's answer into a
//! [`pricewatch_core::PriceRecord`].

mod fallback;
mod http;
pub mod task;

use std::future::Future;
use std::time::Duration;

pub use fallback::{decode_output, FallbackStrategy};
pub use http::{AgentSession, HttpAgentClient};

use crate::error::AgentError;

/// One invocation of the agent.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Natural-language instructions with the target URL filled in.
    pub task: String,
    /// JSON Schema the agent's raw output must satisfy.
    pub output_schema: serde_json::Value,
    pub timeout: Duration,
}

/// Session-scoped access to a browsing agent.
///
/// A session is opened per work item and must be handed back to
/// [`AgentClient::close_session`] once the item is done, whatever the
/// outcome of [`AgentClient::invoke`].
pub trait AgentClient: Send + Sync {
    type Session: Send;

    fn open_session(&self) -> impl Future<Output = Result<Self::Session, AgentError>> + Send;

    /// Runs `request` and returns the agent's raw textual output.
    fn invoke(
        &self,
        session: &mut Self::Session,
        request: &AgentRequest,
    ) -> impl Future<Output = Result<String, AgentError>> + Send;

    /// Releases `session`. Failures are logged by the implementation.
    fn close_session(&self, session: Self::Session) -> impl Future<Output = ()> + Send;
}

/// Agent used when no service is configured: every invocation fails with
/// [`AgentError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAgent;

impl AgentClient for NoAgent {
    type Session = ();

    async fn open_session(&self) -> Result<(), AgentError> {
        Err(AgentError::NotConfigured)
    }

    async fn invoke(
        &self,
        _session: &mut (),
        _request: &AgentRequest,
    ) -> Result<String, AgentError> {
        Err(AgentError::NotConfigured)
    }

    async fn close_session(&self, _session: ()) {}
}
