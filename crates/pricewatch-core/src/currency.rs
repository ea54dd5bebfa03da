//! ISO currency codes and the glyph table used to detect them in scraped
//! price text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Currencies a [`crate::PriceRecord`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
    Krw,
    Cny,
}

/// Currency assumed when price text carries no recognisable symbol.
///
/// This is a policy choice for the storefronts the tool was first pointed
/// at (Indian regional sites that often render bare numbers), not a fact
/// about the page. Callers that know better should not rely on it.
pub const DEFAULT_CURRENCY: CurrencyCode = CurrencyCode::Inr;

/// Detection table, scanned in declaration order; the first entry with any
/// matching glyph wins.
///
/// `¥` is listed for both JPY and CNY. Because JPY is declared first, bare
/// `¥` text always resolves to JPY. Adapters for CNY storefronts must
/// disambiguate before calling the detector.
pub const SYMBOL_TABLE: &[(CurrencyCode, &[&str])] = &[
    (CurrencyCode::Inr, &["₹", "INR"]),
    (CurrencyCode::Usd, &["$", "USD"]),
    (CurrencyCode::Eur, &["€", "EUR"]),
    (CurrencyCode::Gbp, &["£", "GBP"]),
    (CurrencyCode::Jpy, &["¥", "JPY"]),
    (CurrencyCode::Krw, &["₩", "KRW"]),
    (CurrencyCode::Cny, &["¥", "CNY"]),
];

impl CurrencyCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CurrencyCode::Inr => "INR",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Krw => "KRW",
            CurrencyCode::Cny => "CNY",
        }
    }

    /// Every glyph or code in [`SYMBOL_TABLE`], in table order.
    pub fn all_symbols() -> impl Iterator<Item = &'static str> {
        SYMBOL_TABLE
            .iter()
            .flat_map(|(_, symbols)| symbols.iter().copied())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        DEFAULT_CURRENCY
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOL_TABLE
            .iter()
            .map(|(code, _)| *code)
            .find(|code| code.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownCurrency(s.to_string()))
    }
}
