//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub url: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts `url` as an active product, or re-activates it if it already
/// exists (including soft-deleted rows).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn register_product(pool: &PgPool, url: &str) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (url) VALUES ($1) \
         ON CONFLICT (url) DO UPDATE \
         SET is_active = TRUE, is_deleted = FALSE, updated_at = NOW() \
         RETURNING url, is_active, is_deleted, created_at, updated_at",
    )
    .bind(url)
    .fetch_one(pool)
    .await?;

    tracing::debug!(url, "product registered");
    Ok(row)
}

/// Returns all active, non-deleted products ordered by URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_active_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT url, is_active, is_deleted, created_at, updated_at \
         FROM products \
         WHERE is_active = TRUE AND is_deleted = FALSE \
         ORDER BY url",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
