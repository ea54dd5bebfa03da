use pricewatch_core::{PriceRecord, ProductStore, StoreError, TrackedProduct};
use sqlx::PgPool;

use crate::{price_history, products, DbError};

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UnknownProduct { url } => StoreError::UnknownProduct { url },
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

/// [`ProductStore`] backed by the Postgres pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductStore for PgProductStore {
    async fn load_active_products(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        let rows = products::load_active_products(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| TrackedProduct { url: row.url })
            .collect())
    }

    async fn append_price_record(&self, record: &PriceRecord) -> Result<(), StoreError> {
        price_history::append_price_record(&self.pool, record).await?;
        Ok(())
    }

    async fn register_product(&self, url: &str) -> Result<(), StoreError> {
        products::register_product(&self.pool, url).await?;
        Ok(())
    }
}
