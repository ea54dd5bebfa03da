//! Batch scraping over a bounded pool of tokio tasks.
//!
//! Each URL becomes one task that resolves an adapter, extracts a record
//! (deterministically or through the agent fallback) and hands it to the
//! store. At most `max_concurrent` tasks are in flight. Every input URL
//! yields exactly one [`Outcome`], including URLs whose task panicked.

use std::collections::HashMap;
use std::sync::Arc;

use pricewatch_core::{PriceRecord, ProductStore, StoreError};
use tokio::task::{Id, JoinError, JoinSet};

use crate::agent::{AgentClient, FallbackStrategy};
use crate::client::PageFetcher;
use crate::error::ScrapeError;
use crate::pipeline;
use crate::registry::{AdapterRegistry, Resolution};

/// Terminal result for one URL of a batch.
#[derive(Debug)]
pub enum Outcome {
    /// A record was extracted. `persist_error` is set when the store
    /// rejected it; the scrape itself still counts as a success.
    Success {
        record: PriceRecord,
        persist_error: Option<StoreError>,
    },
    Failure {
        url: String,
        error: ScrapeError,
    },
}

impl Outcome {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Outcome::Success { record, .. } => record.source_url(),
            Outcome::Failure { url, .. } => url,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub persist_failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    Outcome::Success { persist_error, .. } => {
                        summary.succeeded += 1;
                        if persist_error.is_some() {
                            summary.persist_failed += 1;
                        }
                    }
                    Outcome::Failure { .. } => summary.failed += 1,
                }
                summary
            })
    }
}

struct Inner<F, A, S> {
    registry: AdapterRegistry,
    fetcher: F,
    fallback: FallbackStrategy<A>,
    store: S,
    max_concurrent: usize,
}

/// Dispatches URLs to the deterministic pipeline or the agent fallback and
/// persists every extracted record.
pub struct Orchestrator<F, A, S> {
    inner: Arc<Inner<F, A, S>>,
}

impl<F, A, S> Orchestrator<F, A, S>
where
    F: PageFetcher + 'static,
    A: AgentClient + 'static,
    S: ProductStore + 'static,
{
    /// `max_concurrent` below 1 is treated as 1.
    pub fn new(
        registry: AdapterRegistry,
        fetcher: F,
        fallback: FallbackStrategy<A>,
        store: S,
        max_concurrent: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                fetcher,
                fallback,
                store,
                max_concurrent: max_concurrent.max(1),
            }),
        }
    }

    /// Loads the active product list once and scrapes it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the product list cannot be loaded.
    /// Per-URL failures are reported as [`Outcome::Failure`].
    pub async fn run_active(&self) -> Result<Vec<Outcome>, StoreError> {
        let products = self.inner.store.load_active_products().await?;
        let urls = products.into_iter().map(|p| p.url).collect();
        Ok(self.run_batch(urls).await)
    }

    /// Scrapes `urls` and returns one outcome per URL in completion order.
    pub async fn run_batch(&self, urls: Vec<String>) -> Vec<Outcome> {
        let total = urls.len();
        tracing::info!(
            url_count = total,
            max_concurrent = self.inner.max_concurrent,
            "starting scrape batch"
        );

        let mut pending = urls.into_iter();
        let mut in_flight: HashMap<Id, String> = HashMap::new();
        let mut tasks = JoinSet::new();
        let mut outcomes = Vec::with_capacity(total);

        loop {
            while in_flight.len() < self.inner.max_concurrent {
                let Some(url) = pending.next() else { break };
                let inner = Arc::clone(&self.inner);
                let task_url = url.clone();
                let handle = tasks.spawn(async move { inner.process(task_url).await });
                in_flight.insert(handle.id(), url);
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };
            let outcome = match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    outcome
                }
                Err(join_error) => {
                    let url = in_flight.remove(&join_error.id()).unwrap_or_default();
                    Outcome::Failure {
                        url,
                        error: ScrapeError::WorkerPanic {
                            message: panic_message(join_error),
                        },
                    }
                }
            };
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes);
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            persist_failed = summary.persist_failed,
            "scrape batch finished"
        );
        outcomes
    }
}

impl<F, A, S> Inner<F, A, S>
where
    F: PageFetcher,
    A: AgentClient,
    S: ProductStore,
{
    async fn process(&self, url: String) -> Outcome {
        match self.scrape(&url).await {
            Ok(record) => {
                let persist_error = self.store.append_price_record(&record).await.err();
                Outcome::Success {
                    record,
                    persist_error,
                }
            }
            Err(error) => Outcome::Failure { url, error },
        }
    }

    async fn scrape(&self, url: &str) -> Result<PriceRecord, ScrapeError> {
        match self.registry.resolve(url)? {
            Resolution::Adapter(adapter) => {
                pipeline::run(&self.fetcher, adapter.as_ref(), url).await
            }
            Resolution::NotFound(source_key) => {
                tracing::debug!(url, %source_key, "no adapter registered, using agent fallback");
                self.fallback.run(url).await
            }
        }
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success {
            record,
            persist_error: None,
        } => tracing::info!(
            url = record.source_url(),
            price = %record.price(),
            currency = %record.currency(),
            available = record.availability(),
            "scraped product"
        ),
        Outcome::Success {
            record,
            persist_error: Some(error),
        } => tracing::error!(
            url = record.source_url(),
            error = %error,
            "scraped product but failed to store price record"
        ),
        Outcome::Failure { url, error } => {
            tracing::warn!(url = %url, error = %error, "scrape failed");
        }
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked with a non-string payload".to_owned())
}
