//! Shared domain types for pricewatch.
//!
//! Everything that more than one crate needs to agree on lives here: the
//! currency table, the [`PriceRecord`] produced per scrape, the persistence
//! collaborator contract, and application configuration.

mod app_config;
mod config;
pub mod currency;
pub mod record;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use currency::{CurrencyCode, DEFAULT_CURRENCY};
pub use record::{PriceRecord, ScrapedFields};
pub use store::{ProductStore, StoreError, TrackedProduct};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("price must be non-negative, got {0}")]
    NegativePrice(rust_decimal::Decimal),

    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}
