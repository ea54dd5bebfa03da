use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use pricewatch_core::{CurrencyCode, PriceRecord, ScrapedFields, StoreError};
use pricewatch_db::PriceHistoryRow;
use pricewatch_scraper::{BatchSummary, Outcome, ScrapeError};
use rust_decimal::Decimal;

use super::*;
use crate::products::format_history_row;
use crate::scrape::{format_outcome, format_summary};

fn record(available: bool) -> PriceRecord {
    PriceRecord::new(
        "https://www.nike.com/t/shoe",
        ScrapedFields {
            name: "Air Jordan 1 Low".to_string(),
            price: Decimal::new(1_299_500, 2),
            currency: CurrencyCode::Inr,
            availability: available,
            main_image_url: "https://static.nike.com/hero.png".to_string(),
            additional_data: BTreeMap::new(),
        },
        Utc::now(),
    )
    .expect("non-negative price")
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["pricewatch", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Ping
        }
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["pricewatch", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Migrate
        }
    ));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["pricewatch"]).is_err());
}

#[test]
fn scrape_defaults_to_all_products() {
    let cli = Cli::try_parse_from(["pricewatch", "scrape"]).unwrap();
    let Commands::Scrape { urls, dry_run } = cli.command else {
        panic!("expected scrape command");
    };
    assert!(urls.is_empty());
    assert!(!dry_run);
}

#[test]
fn scrape_accepts_repeated_urls_and_dry_run() {
    let cli = Cli::try_parse_from([
        "pricewatch",
        "scrape",
        "--url",
        "https://www.nike.com/a",
        "--url",
        "https://www.adidas.com/b",
        "--dry-run",
    ])
    .unwrap();
    let Commands::Scrape { urls, dry_run } = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(urls, vec!["https://www.nike.com/a", "https://www.adidas.com/b"]);
    assert!(dry_run);
}

#[test]
fn add_requires_url() {
    assert!(Cli::try_parse_from(["pricewatch", "add"]).is_err());
    let cli = Cli::try_parse_from(["pricewatch", "add", "https://www.nike.com/a"]).unwrap();
    assert!(matches!(cli.command, Commands::Add { ref url } if url == "https://www.nike.com/a"));
}

#[test]
fn history_limit_defaults_and_rejects_zero() {
    let cli = Cli::try_parse_from(["pricewatch", "history", "https://www.nike.com/a"]).unwrap();
    assert!(matches!(cli.command, Commands::History { limit: 20, .. }));

    assert!(
        Cli::try_parse_from(["pricewatch", "history", "https://x.com/a", "--limit", "0"]).is_err()
    );
}

#[test]
fn format_outcome_success_line() {
    let outcome = Outcome::Success {
        record: record(true),
        persist_error: None,
    };
    assert_eq!(
        format_outcome(&outcome),
        "ok    https://www.nike.com/t/shoe  12995.00 INR  in stock"
    );
}

#[test]
fn format_outcome_notes_persist_failure() {
    let outcome = Outcome::Success {
        record: record(false),
        persist_error: Some(StoreError::UnknownProduct {
            url: "https://www.nike.com/t/shoe".to_string(),
        }),
    };
    let line = format_outcome(&outcome);
    assert!(line.contains("sold out"));
    assert!(line.contains("not stored: product not registered"));
}

#[test]
fn format_outcome_failure_line() {
    let outcome = Outcome::Failure {
        url: "https://www.nike.com/t/shoe".to_string(),
        error: ScrapeError::FieldNotFound("title"),
    };
    assert_eq!(
        format_outcome(&outcome),
        "fail  https://www.nike.com/t/shoe  field not found: title"
    );
}

#[test]
fn format_summary_mentions_dry_run() {
    let summary = BatchSummary {
        total: 3,
        succeeded: 2,
        failed: 1,
        persist_failed: 0,
    };
    assert_eq!(
        format_summary(&summary, true),
        "2 of 3 succeeded, 1 failed (dry run, nothing stored)"
    );
    assert_eq!(format_summary(&summary, false), "2 of 3 succeeded, 1 failed");
}

#[test]
fn format_history_row_is_one_line() {
    let captured_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
    let row = PriceHistoryRow {
        id: 1,
        public_id: uuid::Uuid::nil(),
        product_url: "https://www.nike.com/t/shoe".to_string(),
        name: "Air Jordan 1 Low".to_string(),
        price: Decimal::new(1_299_500, 2),
        currency: "INR".to_string(),
        main_image_url: "https://static.nike.com/hero.png".to_string(),
        availability: true,
        additional_data: serde_json::json!({}),
        captured_at,
        created_at: captured_at,
    };
    let line = format_history_row(&row);
    assert!(line.starts_with("2025-03-01 12:30:00"));
    assert!(line.contains("12995.00 INR"));
    assert!(line.ends_with("Air Jordan 1 Low"));
}
