//! [`AgentClient`] for a browsing-agent service reachable over HTTP.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AgentClient, AgentRequest};
use crate::error::AgentError;

/// Handle for one open agent session.
#[derive(Debug)]
pub struct AgentSession {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OpenSessionResponse {
    session_id: String,
}

#[derive(Debug, Serialize)]
struct RunBody<'a> {
    task: &'a str,
    output_schema: &'a serde_json::Value,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the agent service's session API:
///
/// - `POST /v1/sessions` opens a session
/// - `POST /v1/sessions/{id}/run` executes one task
/// - `DELETE /v1/sessions/{id}` releases it
pub struct HttpAgentClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpAgentClient {
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AgentError::Protocol`] if `base_url` is not an absolute
    /// hierarchical URL.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| AgentError::Protocol(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AgentError::Protocol(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(str::to_owned),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AgentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AgentError::Protocol(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AgentError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AgentError::Protocol(e.to_string()))
    }
}

impl AgentClient for HttpAgentClient {
    type Session = AgentSession;

    async fn open_session(&self) -> Result<AgentSession, AgentError> {
        let url = self.endpoint(&["v1", "sessions"])?;
        let request = self.authorized(self.client.post(url).json(&serde_json::json!({})));
        let opened: OpenSessionResponse = Self::send_json(request).await?;
        tracing::debug!(session_id = %opened.session_id, "agent session opened");
        Ok(AgentSession {
            id: opened.session_id,
        })
    }

    async fn invoke(
        &self,
        session: &mut AgentSession,
        request: &AgentRequest,
    ) -> Result<String, AgentError> {
        let url = self.endpoint(&["v1", "sessions", &session.id, "run"])?;
        let body = RunBody {
            task: &request.task,
            output_schema: &request.output_schema,
            timeout_secs: request.timeout.as_secs(),
        };
        let run: RunResponse =
            Self::send_json(self.authorized(self.client.post(url).json(&body))).await?;

        match (run.output, run.error) {
            (_, Some(error)) => Err(AgentError::Agent(error)),
            (Some(output), None) => Ok(output),
            (None, None) => Err(AgentError::Protocol(
                "run response has neither output nor error".to_owned(),
            )),
        }
    }

    async fn close_session(&self, session: AgentSession) {
        let url = match self.endpoint(&["v1", "sessions", &session.id]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "cannot build close URL");
                return;
            }
        };
        match self.authorized(self.client.delete(url)).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(session_id = %session.id, "agent session closed");
            }
            Ok(response) => {
                tracing::warn!(
                    session_id = %session.id,
                    status = response.status().as_u16(),
                    "agent session close rejected"
                );
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "agent session close failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let client = HttpAgentClient::new("http://agent.local:9000/api/", None, 30).unwrap();
        let url = client.endpoint(&["v1", "sessions", "abc", "run"]).unwrap();
        assert_eq!(url.as_str(), "http://agent.local:9000/api/v1/sessions/abc/run");
    }

    #[test]
    fn endpoint_escapes_session_id() {
        let client = HttpAgentClient::new("http://agent.local", None, 30).unwrap();
        let url = client.endpoint(&["v1", "sessions", "a/b"]).unwrap();
        assert_eq!(url.path(), "/v1/sessions/a%2Fb");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        assert!(matches!(
            HttpAgentClient::new("not a url", None, 30),
            Err(AgentError::Protocol(_))
        ));
    }
}
