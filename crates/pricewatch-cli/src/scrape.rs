//! `scrape` command handler.
//!
//! Per-URL failures are printed and counted; the command only fails when
//! every URL in a non-empty batch failed.

use std::time::Duration;

use pricewatch_core::{AppConfig, PriceRecord, ProductStore, StoreError, TrackedProduct};
use pricewatch_db::PgProductStore;
use pricewatch_scraper::{
    AdapterRegistry, AgentClient, BatchSummary, BrowserClient, FallbackStrategy, HttpAgentClient,
    NoAgent, Orchestrator, Outcome,
};

/// Store used by `--dry-run`: accepts every record and keeps none.
struct DryRunStore;

impl ProductStore for DryRunStore {
    async fn load_active_products(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        Ok(Vec::new())
    }

    async fn append_price_record(&self, _record: &PriceRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn register_product(&self, _url: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Scrape `urls`, or every active product when `urls` is empty.
///
/// # Errors
///
/// Returns an error if the database or HTTP clients cannot be set up, or if
/// every URL in the batch failed.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    urls: Vec<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    // A dry run over explicit URLs never touches the database.
    let store = if urls.is_empty() || !dry_run {
        Some(PgProductStore::new(crate::products::connect(config).await?))
    } else {
        None
    };

    let urls = match (&store, urls.is_empty()) {
        (Some(store), true) => store
            .load_active_products()
            .await?
            .into_iter()
            .map(|p| p.url)
            .collect(),
        _ => urls,
    };

    if urls.is_empty() {
        println!("no active products to scrape");
        return Ok(());
    }

    let outcomes = match store {
        Some(store) if !dry_run => execute(config, store, urls).await?,
        _ => execute(config, DryRunStore, urls).await?,
    };

    for outcome in &outcomes {
        println!("{}", format_outcome(outcome));
    }
    let summary = BatchSummary::from_outcomes(&outcomes);
    println!("{}", format_summary(&summary, dry_run));

    if summary.total > 0 && summary.succeeded == 0 {
        anyhow::bail!("all {} URL(s) failed to scrape", summary.total);
    }
    Ok(())
}

async fn execute<S: ProductStore + 'static>(
    config: &AppConfig,
    store: S,
    urls: Vec<String>,
) -> anyhow::Result<Vec<Outcome>> {
    match config.agent_url.as_deref() {
        Some(agent_url) => {
            let agent = HttpAgentClient::new(
                agent_url,
                config.agent_api_key.as_deref(),
                config.agent_timeout_secs,
            )?;
            execute_with_agent(config, agent, store, urls).await
        }
        None => {
            tracing::debug!("PRICEWATCH_AGENT_URL not set; unsupported sites will fail");
            execute_with_agent(config, NoAgent, store, urls).await
        }
    }
}

async fn execute_with_agent<A, S>(
    config: &AppConfig,
    agent: A,
    store: S,
    urls: Vec<String>,
) -> anyhow::Result<Vec<Outcome>>
where
    A: AgentClient + 'static,
    S: ProductStore + 'static,
{
    let fetcher = BrowserClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_ms,
    )?;
    let orchestrator = Orchestrator::new(
        AdapterRegistry::builtin()?,
        fetcher,
        FallbackStrategy::new(agent, Duration::from_secs(config.agent_timeout_secs)),
        store,
        config.scraper_max_concurrent,
    );
    Ok(orchestrator.run_batch(urls).await)
}

pub(crate) fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success {
            record,
            persist_error,
        } => {
            let stock = if record.availability() {
                "in stock"
            } else {
                "sold out"
            };
            let mut line = format!(
                "ok    {}  {} {}  {stock}",
                record.source_url(),
                record.price(),
                record.currency()
            );
            if let Some(err) = persist_error {
                line.push_str(&format!("  (not stored: {err})"));
            }
            line
        }
        Outcome::Failure { url, error } => format!("fail  {url}  {error}"),
    }
}

pub(crate) fn format_summary(summary: &BatchSummary, dry_run: bool) -> String {
    let mut line = format!(
        "{} of {} succeeded, {} failed",
        summary.succeeded, summary.total, summary.failed
    );
    if dry_run {
        line.push_str(" (dry run, nothing stored)");
    } else if summary.persist_failed > 0 {
        line.push_str(&format!(", {} not stored", summary.persist_failed));
    }
    line
}
