//! `add` and `history` command handlers.

use pricewatch_core::AppConfig;
use pricewatch_db::{PoolConfig, PriceHistoryRow};
use pricewatch_scraper::{AdapterRegistry, SourceKey};

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = pricewatch_db::connect_pool(
        &config.database_url,
        PoolConfig::from_app_config(config),
    )
    .await?;
    Ok(pool)
}

/// Register `url` for tracking after checking that a source key can be
/// derived from it.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the database write fails.
pub(crate) async fn run_add(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let url = url.trim();
    let key = SourceKey::from_url(url)?;

    let registry = AdapterRegistry::builtin()?;
    if !registry.resolve(url)?.is_found() {
        tracing::warn!(
            url,
            source_key = %key,
            "no site adapter; scrapes will use the agent fallback"
        );
    }

    let pool = connect(config).await?;
    let row = pricewatch_db::register_product(&pool, url).await?;
    println!("tracking {} (source: {key})", row.url);
    Ok(())
}

/// Print up to `limit` recorded prices for `url`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(config: &AppConfig, url: &str, limit: u32) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let rows = pricewatch_db::list_price_history(&pool, url.trim(), i64::from(limit)).await?;

    if rows.is_empty() {
        println!("no price history for {url}");
        return Ok(());
    }
    for row in &rows {
        println!("{}", format_history_row(row));
    }
    Ok(())
}

pub(crate) fn format_history_row(row: &PriceHistoryRow) -> String {
    let stock = if row.availability { "in stock" } else { "sold out" };
    format!(
        "{}  {:>12} {}  {:<8}  {}",
        row.captured_at.format("%Y-%m-%d %H:%M:%S"),
        row.price,
        row.currency,
        stock,
        row.name
    )
}
