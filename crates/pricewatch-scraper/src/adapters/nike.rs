//! nike.com product pages.
//!
//! Nike marks nodes with `data-testid` attributes. The price container holds
//! the current (possibly discounted) price only; discounts appear as a
//! separate `OfferPercentage` badge.

use super::SiteSelectors;

pub const SELECTORS: SiteSelectors = SiteSelectors {
    source_key: "nike",
    title: r#"h1[data-testid="product_title"]"#,
    price: r#"span[data-testid="currentPrice-container"]"#,
    sold_out: r#"[data-testid="sold-out-container"]"#,
    image: r#"img[data-testid="HeroImg"]"#,
    image_attr: "src",
    additional: &[
        ("offer", r#"span[data-testid="OfferPercentage"]"#),
        ("sold_out_text", r#"[data-testid="sold-out-container"]"#),
    ],
};
