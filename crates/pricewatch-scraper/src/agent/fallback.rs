use std::collections::BTreeMap;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use pricewatch_core::{PriceRecord, ScrapedFields};
use serde::{Deserialize, Deserializer};
use tokio::time::{timeout_at, Instant};

use super::{task, AgentClient, AgentRequest};
use crate::error::{AgentError, ScrapeError};
use crate::normalize::{clean_additional_data, parse_currency, parse_price};

/// What the agent must answer with. Unknown keys are a schema violation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentOutput {
    title: String,
    price: String,
    /// Required but not trusted; the currency is re-derived from `price`.
    #[serde(rename = "currency")]
    _currency: String,
    availability: bool,
    image_url: String,
    #[serde(deserialize_with = "required_nullable")]
    additional_data: Option<BTreeMap<String, Option<String>>>,
}

/// Like a plain `Option` field, but a missing key is an error; only an
/// explicit `null` decodes to `None`.
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Upper bound on releasing a session once the item is finished.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Extracts a record for an unsupported storefront by delegating to a
/// browsing agent.
pub struct FallbackStrategy<A> {
    agent: A,
    timeout: Duration,
}

impl<A: AgentClient> FallbackStrategy<A> {
    pub fn new(agent: A, timeout: Duration) -> Self {
        Self { agent, timeout }
    }

    /// # Errors
    ///
    /// [`ScrapeError::AgentInvocation`] if the session cannot be opened, the
    /// agent fails or the timeout elapses. [`ScrapeError::AgentSchema`] if
    /// the output is not the required JSON object. Normalization errors as in
    /// the deterministic path.
    pub async fn run(&self, url: &str) -> Result<PriceRecord, ScrapeError> {
        let request = AgentRequest {
            task: task::render(url),
            output_schema: task::output_schema(),
            timeout: self.timeout,
        };
        let output = self.invoke_scoped(&request).await?;
        decode_output(url, &output, Utc::now())
    }

    /// Opens a session and invokes once, both under the request timeout,
    /// then closes the session before returning, panicking, or reporting a
    /// timeout.
    async fn invoke_scoped(&self, request: &AgentRequest) -> Result<String, AgentError> {
        let deadline = Instant::now() + request.timeout;

        let mut session = match timeout_at(deadline, self.agent.open_session()).await {
            Ok(opened) => opened?,
            Err(_elapsed) => return Err(timed_out(request, "opening agent session timed out")),
        };

        let invocation = AssertUnwindSafe(timeout_at(
            deadline,
            self.agent.invoke(&mut session, request),
        ))
        .catch_unwind()
        .await;

        if tokio::time::timeout(CLOSE_TIMEOUT, self.agent.close_session(session))
            .await
            .is_err()
        {
            tracing::warn!(
                close_timeout_secs = CLOSE_TIMEOUT.as_secs(),
                "closing agent session timed out"
            );
        }

        match invocation {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(timed_out(request, "agent invocation timed out")),
            Err(panic) => resume_unwind(panic),
        }
    }
}

fn timed_out(request: &AgentRequest, message: &'static str) -> AgentError {
    let timeout_secs = request.timeout.as_secs();
    tracing::warn!(timeout_secs, "{message}");
    AgentError::Timeout { timeout_secs }
}

/// Decodes raw agent output into a record for `url`.
///
/// The output must be exactly one JSON object matching the agent schema;
/// nothing is stripped or repaired first.
///
/// # Errors
///
/// [`ScrapeError::AgentSchema`] on any decode failure,
/// [`ScrapeError::FieldNotFound`] for a blank title or image URL, and
/// [`ScrapeError::PriceParse`] if the price text does not normalize.
pub fn decode_output(
    url: &str,
    raw: &str,
    captured_at: DateTime<Utc>,
) -> Result<PriceRecord, ScrapeError> {
    let output: AgentOutput =
        serde_json::from_str(raw).map_err(|source| ScrapeError::AgentSchema { source })?;

    let name = non_blank(output.title, "title")?;
    let main_image_url = non_blank(output.image_url, "image")?;
    let price = parse_price(&output.price)?;
    let currency = parse_currency(&output.price);
    let additional_data = clean_additional_data(output.additional_data);

    let fields = ScrapedFields {
        name,
        price,
        currency,
        availability: output.availability,
        main_image_url,
        additional_data,
    };
    Ok(PriceRecord::new(url, fields, captured_at)?)
}

fn non_blank(value: String, field: &'static str) -> Result<String, ScrapeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::FieldNotFound(field));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;
