//! Price and currency normalization for scraped text.
//!
//! Site markup renders the same value as `"₹12,995"`, `"Price ₹ 12,995.00"`
//! or `"$120.00"`; everything here turns that into typed values. All
//! functions are pure.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use pricewatch_core::currency::SYMBOL_TABLE;
use pricewatch_core::{CurrencyCode, DEFAULT_CURRENCY};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ScrapeError;

/// What must remain once glyphs, labels and separators are stripped.
static PLAIN_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid regex"));

const PRICE_LABEL: &str = "Price";
const THOUSANDS_SEPARATOR: char = ',';

/// Parses raw price text into a non-negative decimal.
///
/// Strips every glyph and code in the currency table, the literal label
/// `"Price"`, `,` thousands separators and all Unicode whitespace (including
/// the non-breaking spaces storefronts put between symbol and amount), then
/// requires the remainder to be a plain decimal number.
///
/// # Errors
///
/// Returns [`ScrapeError::PriceParse`] if the remainder is empty, has more
/// than one decimal point, or contains any other character.
pub fn parse_price(raw: &str) -> Result<Decimal, ScrapeError> {
    let mut cleaned = raw.replace(PRICE_LABEL, "");
    for symbol in CurrencyCode::all_symbols() {
        cleaned = cleaned.replace(symbol, "");
    }
    cleaned.retain(|c| c != THOUSANDS_SEPARATOR && !c.is_whitespace());

    if cleaned.is_empty() {
        return Err(price_error(raw, "no numeric content"));
    }
    if !PLAIN_NUMBER_RE.is_match(&cleaned) {
        return Err(price_error(
            raw,
            &format!("\"{cleaned}\" is not a plain decimal number"),
        ));
    }

    Decimal::from_str(&cleaned).map_err(|e| price_error(raw, &e.to_string()))
}

/// Detects the currency of raw price text, falling back to
/// [`DEFAULT_CURRENCY`] when no symbol matches.
#[must_use]
pub fn parse_currency(raw: &str) -> CurrencyCode {
    parse_currency_or(raw, DEFAULT_CURRENCY)
}

/// Scans `raw` against the currency table in declaration order and returns
/// the first code with a matching glyph, or `default`.
///
/// Ties resolve by table order: text containing only `¥` yields JPY even on
/// a CNY storefront.
#[must_use]
pub fn parse_currency_or(raw: &str, default: CurrencyCode) -> CurrencyCode {
    SYMBOL_TABLE
        .iter()
        .find(|(_, symbols)| symbols.iter().any(|symbol| raw.contains(symbol)))
        .map_or(default, |(code, _)| *code)
}

/// Drops entries whose value is absent and keeps everything else verbatim.
/// Absent input yields an empty map.
#[must_use]
pub fn clean_additional_data<I>(raw: Option<I>) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    raw.into_iter()
        .flatten()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

fn price_error(raw: &str, reason: &str) -> ScrapeError {
    ScrapeError::PriceParse {
        raw: raw.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
