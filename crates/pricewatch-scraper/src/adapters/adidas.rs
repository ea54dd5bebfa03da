//! adidas product pages.
//!
//! The hero image has no stable marker of its own; the first `<img>` inside
//! the gallery container is the primary shot.

use super::SiteSelectors;

pub const SELECTORS: SiteSelectors = SiteSelectors {
    source_key: "adidas",
    title: r#"h1[data-testid="product-title"]"#,
    price: r#"div[data-testid="main-price"]"#,
    sold_out: r#"section[data-testid="sold-out-signup"]"#,
    image: "div#navigation-target-gallery img",
    image_attr: "src",
    additional: &[("sold_out_text", r#"section[data-testid="sold-out-signup"]"#)],
};
