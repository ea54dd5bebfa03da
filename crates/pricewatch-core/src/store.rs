//! Contract for the persistence collaborator the scrape orchestrator hands
//! records to.

use std::future::Future;

use thiserror::Error;

use crate::PriceRecord;

/// A product URL currently being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedProduct {
    pub url: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("product not registered: {url}")]
    UnknownProduct { url: String },
}

/// Persistence operations consumed by a batch run.
///
/// Implementations serialize their own writes; callers may invoke
/// [`ProductStore::append_price_record`] from several tasks at once.
pub trait ProductStore: Send + Sync {
    /// Returns tracked products that are active and not deleted.
    fn load_active_products(
        &self,
    ) -> impl Future<Output = Result<Vec<TrackedProduct>, StoreError>> + Send;

    /// Inserts a new history entry. Never updates an existing one.
    fn append_price_record(
        &self,
        record: &PriceRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Upserts a product by URL.
    fn register_product(&self, url: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
