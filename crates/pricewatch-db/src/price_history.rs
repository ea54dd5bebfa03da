//! Database operations for the append-only `price_history` table.

use chrono::{DateTime, Utc};
use pricewatch_core::PriceRecord;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `price_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub public_id: Uuid,
    pub product_url: String,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub main_image_url: String,
    pub availability: bool,
    pub additional_data: Value,
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, public_id, product_url, name, price, currency, main_image_url, \
                       availability, additional_data, captured_at, created_at";

/// Inserts `record` as a new history entry. Existing entries are never
/// touched.
///
/// # Errors
///
/// Returns [`DbError::UnknownProduct`] if the record's URL is not in
/// `products`, or [`DbError::Sqlx`] for any other failure.
pub async fn append_price_record(
    pool: &PgPool,
    record: &PriceRecord,
) -> Result<PriceHistoryRow, DbError> {
    let additional_data: Map<String, Value> = record
        .additional_data()
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    let result = sqlx::query_as::<_, PriceHistoryRow>(&format!(
        "INSERT INTO price_history \
         (public_id, product_url, name, price, currency, main_image_url, \
          availability, additional_data, captured_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(record.source_url())
    .bind(record.name())
    .bind(record.price())
    .bind(record.currency().as_str())
    .bind(record.main_image_url())
    .bind(record.availability())
    .bind(Value::Object(additional_data))
    .bind(record.captured_at())
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            Err(DbError::UnknownProduct {
                url: record.source_url().to_owned(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns up to `limit` history entries for `url`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_history(
    pool: &PgPool,
    url: &str,
    limit: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRow>(&format!(
        "SELECT {COLUMNS} FROM price_history \
         WHERE product_url = $1 \
         ORDER BY captured_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(url)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
