//! Site adapters: the extraction contract and its selector-driven
//! implementation.
//!
//! A site is described entirely by a [`SiteSelectors`] table. Adding a
//! storefront means adding a table (see [`nike`] and [`adidas`]) and
//! registering it in [`crate::registry`]; nothing in the pipeline or the
//! orchestrator changes.

pub mod adidas;
pub mod nike;

use std::collections::BTreeMap;

use pricewatch_core::{CurrencyCode, DEFAULT_CURRENCY};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::normalize::{parse_currency, parse_price};

/// Capability every site adapter provides over a parsed product page.
///
/// `extract_availability`, `extract_currency` and `extract_additional`
/// always produce a value. The other three fail when their node is missing.
pub trait Extractor: Send + Sync {
    /// Registry key this adapter is served under, e.g. `"nike"`.
    fn source_key(&self) -> &str;

    /// # Errors
    ///
    /// [`ScrapeError::FieldNotFound`] with `"title"` if the node is absent or empty.
    fn extract_title(&self, doc: &Html) -> Result<String, ScrapeError>;

    /// # Errors
    ///
    /// [`ScrapeError::FieldNotFound`] with `"price"` if the node is absent,
    /// or [`ScrapeError::PriceParse`] if its text is not a price.
    fn extract_price(&self, doc: &Html) -> Result<Decimal, ScrapeError>;

    /// In stock unless the site's sold-out marker is present.
    fn extract_availability(&self, doc: &Html) -> bool;

    /// # Errors
    ///
    /// [`ScrapeError::FieldNotFound`] with `"image"` if the node or its URL
    /// attribute is absent.
    fn extract_image_url(&self, doc: &Html) -> Result<String, ScrapeError>;

    /// Re-reads the price node; [`DEFAULT_CURRENCY`] when it is absent.
    fn extract_currency(&self, doc: &Html) -> CurrencyCode;

    /// Best-effort promotional and sold-out text. Every key the site
    /// defines is present, with `""` when its node is absent.
    fn extract_additional(&self, doc: &Html) -> BTreeMap<String, String>;
}

/// CSS selectors describing where one storefront keeps each field.
#[derive(Debug, Clone, Copy)]
pub struct SiteSelectors {
    pub source_key: &'static str,
    pub title: &'static str,
    pub price: &'static str,
    /// Presence of this node means the product is sold out.
    pub sold_out: &'static str,
    pub image: &'static str,
    /// Attribute on the image node holding its URL.
    pub image_attr: &'static str,
    /// `(key, selector)` pairs for the additional-data map. Each key is
    /// always emitted; its value is the node text, or `""` when absent.
    pub additional: &'static [(&'static str, &'static str)],
}

/// An [`Extractor`] driven by a compiled [`SiteSelectors`] table.
#[derive(Debug)]
pub struct SelectorAdapter {
    source_key: &'static str,
    title: Selector,
    price: Selector,
    sold_out: Selector,
    image: Selector,
    image_attr: &'static str,
    additional: Vec<(&'static str, Selector)>,
}

impl SelectorAdapter {
    /// Compiles every selector in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidSelector`] for the first selector that
    /// does not parse.
    pub fn compile(table: &SiteSelectors) -> Result<Self, ScrapeError> {
        let additional = table
            .additional
            .iter()
            .map(|(key, css)| Ok((*key, compile_selector(css)?)))
            .collect::<Result<Vec<_>, ScrapeError>>()?;

        Ok(Self {
            source_key: table.source_key,
            title: compile_selector(table.title)?,
            price: compile_selector(table.price)?,
            sold_out: compile_selector(table.sold_out)?,
            image: compile_selector(table.image)?,
            image_attr: table.image_attr,
            additional,
        })
    }
}

impl Extractor for SelectorAdapter {
    fn source_key(&self) -> &str {
        self.source_key
    }

    fn extract_title(&self, doc: &Html) -> Result<String, ScrapeError> {
        first_text(doc, &self.title)
            .filter(|t| !t.is_empty())
            .ok_or(ScrapeError::FieldNotFound("title"))
    }

    fn extract_price(&self, doc: &Html) -> Result<Decimal, ScrapeError> {
        let text = first_text(doc, &self.price).ok_or(ScrapeError::FieldNotFound("price"))?;
        parse_price(&text)
    }

    fn extract_availability(&self, doc: &Html) -> bool {
        doc.select(&self.sold_out).next().is_none()
    }

    fn extract_image_url(&self, doc: &Html) -> Result<String, ScrapeError> {
        doc.select(&self.image)
            .next()
            .and_then(|img| img.value().attr(self.image_attr))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .ok_or(ScrapeError::FieldNotFound("image"))
    }

    fn extract_currency(&self, doc: &Html) -> CurrencyCode {
        first_text(doc, &self.price).map_or(DEFAULT_CURRENCY, |text| parse_currency(&text))
    }

    fn extract_additional(&self, doc: &Html) -> BTreeMap<String, String> {
        self.additional
            .iter()
            .map(|(key, selector)| {
                ((*key).to_owned(), first_text(doc, selector).unwrap_or_default())
            })
            .collect()
    }
}

fn compile_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Trimmed text of the first node matching `selector`, whitespace runs
/// collapsed to single spaces.
fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROKEN: SiteSelectors = SiteSelectors {
        source_key: "broken",
        title: "h1[",
        price: "span",
        sold_out: "div",
        image: "img",
        image_attr: "src",
        additional: &[],
    };

    #[test]
    fn compile_reports_invalid_selector() {
        let err = SelectorAdapter::compile(&BROKEN).unwrap_err();
        assert!(
            matches!(err, ScrapeError::InvalidSelector { ref selector, .. } if selector == "h1["),
            "got: {err:?}"
        );
    }

    #[test]
    fn element_text_collapses_whitespace_across_nodes() {
        let doc = Html::parse_fragment("<p>  Air <b>Jordan</b>\n  1   Low </p>");
        let sel = Selector::parse("p").unwrap();
        assert_eq!(first_text(&doc, &sel).as_deref(), Some("Air Jordan 1 Low"));
    }
}
