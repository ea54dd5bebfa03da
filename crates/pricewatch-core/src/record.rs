use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{CoreError, CurrencyCode};

/// Field values extracted from one product page, before they are stamped
/// with a source URL and capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedFields {
    pub name: String,
    pub price: Decimal,
    pub currency: CurrencyCode,
    pub availability: bool,
    pub main_image_url: String,
    pub additional_data: BTreeMap<String, String>,
}

/// One normalized, timestamped scrape result for a single URL.
///
/// Fields are private so a record cannot be altered after construction;
/// [`PriceRecord::new`] is the only way to build one and it rejects a
/// negative price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    source_url: String,
    name: String,
    price: Decimal,
    currency: CurrencyCode,
    availability: bool,
    main_image_url: String,
    captured_at: DateTime<Utc>,
    additional_data: BTreeMap<String, String>,
}

impl PriceRecord {
    /// # Errors
    ///
    /// Returns [`CoreError::NegativePrice`] if `fields.price` is below zero.
    pub fn new(
        source_url: impl Into<String>,
        fields: ScrapedFields,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if fields.price < Decimal::ZERO {
            return Err(CoreError::NegativePrice(fields.price));
        }

        Ok(Self {
            source_url: source_url.into(),
            name: fields.name,
            price: fields.price,
            currency: fields.currency,
            availability: fields.availability,
            main_image_url: fields.main_image_url,
            captured_at,
            additional_data: fields.additional_data,
        })
    }

    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// `true` when the product was in stock at capture time.
    #[must_use]
    pub fn availability(&self) -> bool {
        self.availability
    }

    #[must_use]
    pub fn main_image_url(&self) -> &str {
        &self.main_image_url
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    #[must_use]
    pub fn additional_data(&self) -> &BTreeMap<String, String> {
        &self.additional_data
    }
}
