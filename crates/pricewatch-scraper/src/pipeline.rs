//! Deterministic fetch → parse → extract path for URLs with a registered
//! adapter.

use chrono::{DateTime, Utc};
use pricewatch_core::{PriceRecord, ScrapedFields};
use scraper::Html;

use crate::adapters::Extractor;
use crate::client::PageFetcher;
use crate::error::ScrapeError;

/// Fetches `url` and extracts a record with `adapter`.
///
/// # Errors
///
/// Fetch errors from `fetcher`, [`ScrapeError::ParseDocument`] for an empty
/// body, and the first extraction failure. No partial record is produced.
pub async fn run<F: PageFetcher>(
    fetcher: &F,
    adapter: &dyn Extractor,
    url: &str,
) -> Result<PriceRecord, ScrapeError> {
    let body = fetcher.fetch(url).await?;
    extract_record(adapter, url, &body, Utc::now())
}

/// Runs every adapter method over `body` in order: title, price,
/// availability, image, currency, additional.
///
/// # Errors
///
/// See [`run`].
pub fn extract_record(
    adapter: &dyn Extractor,
    url: &str,
    body: &str,
    captured_at: DateTime<Utc>,
) -> Result<PriceRecord, ScrapeError> {
    let doc = parse_document(url, body)?;

    let name = adapter.extract_title(&doc)?;
    let price = adapter.extract_price(&doc)?;
    let availability = adapter.extract_availability(&doc);
    let main_image_url = adapter.extract_image_url(&doc)?;
    let currency = adapter.extract_currency(&doc);
    let additional_data = adapter.extract_additional(&doc);

    let fields = ScrapedFields {
        name,
        price,
        currency,
        availability,
        main_image_url,
        additional_data,
    };
    Ok(PriceRecord::new(url, fields, captured_at)?)
}

/// The HTML parser accepts any input, so the only unparseable document is
/// one with no content at all.
fn parse_document(url: &str, body: &str) -> Result<Html, ScrapeError> {
    if body.trim().is_empty() {
        return Err(ScrapeError::ParseDocument {
            url: url.to_owned(),
            reason: "response body is empty".to_owned(),
        });
    }
    Ok(Html::parse_document(body))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pricewatch_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::{nike, SelectorAdapter};

    const URL: &str = "https://www.nike.com/t/shoe/553558-169";

    fn adapter() -> SelectorAdapter {
        SelectorAdapter::compile(&nike::SELECTORS).unwrap()
    }

    struct StaticPage(&'static str);

    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &str) -> Result<String, ScrapeError> {
            Ok(self.0.to_owned())
        }
    }

    const PAGE: &str = r#"<html><body>
        <h1 data-testid="product_title">Air Jordan 1 Low</h1>
        <span data-testid="currentPrice-container">₹12,995</span>
        <img data-testid="HeroImg" src="https://static.nike.com/hero.png" />
    </body></html>"#;

    #[tokio::test]
    async fn run_produces_normalized_record() {
        let record = run(&StaticPage(PAGE), &adapter(), URL).await.unwrap();
        assert_eq!(record.source_url(), URL);
        assert_eq!(record.price(), Decimal::from_str("12995.00").unwrap());
        assert_eq!(record.currency(), CurrencyCode::Inr);
        assert!(record.availability());
        assert_eq!(record.main_image_url(), "https://static.nike.com/hero.png");
    }

    #[test]
    fn missing_title_aborts_before_other_fields() {
        let page = PAGE.replace("product_title", "something_else");
        let err = extract_record(&adapter(), URL, &page, Utc::now()).unwrap_err();
        assert!(matches!(err, ScrapeError::FieldNotFound("title")));
    }

    #[test]
    fn unparseable_price_aborts_item() {
        let page = PAGE.replace("₹12,995", "Coming soon");
        let err = extract_record(&adapter(), URL, &page, Utc::now()).unwrap_err();
        assert!(matches!(err, ScrapeError::PriceParse { .. }));
    }

    #[test]
    fn missing_image_aborts_item() {
        let page = PAGE.replace("HeroImg", "Thumb");
        let err = extract_record(&adapter(), URL, &page, Utc::now()).unwrap_err();
        assert!(matches!(err, ScrapeError::FieldNotFound("image")));
    }

    #[test]
    fn empty_body_is_parse_document_error() {
        let err = extract_record(&adapter(), URL, "  \n ", Utc::now()).unwrap_err();
        assert!(matches!(err, ScrapeError::ParseDocument { ref url, .. } if url == URL));
    }
}
