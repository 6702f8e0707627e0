//! Out-of-stock detection for product pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::jsonld;

static OUT_OF_STOCK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)out\s+of\s+stock|sold\s+out|esgotado|sem\s+stock|sin\s+stock|agotado|indispon[ií]vel|n[aã]o\s+dispon[ií]vel|rupture\s+de\s+stock",
    )
    .expect("valid out-of-stock text regex")
});

static OUT_OF_STOCK_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)out.?of.?stock|sold.?out|unavailable").expect("valid out-of-stock class regex")
});

static AVAILABILITY_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"meta[property="product:availability"], meta[property="og:availability"], [itemprop="availability"]"#,
    )
    .expect("valid availability selector")
});

static WITH_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").expect("valid class selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    InStock,
    OutOfStock,
}

fn classify(value: &str) -> Option<Availability> {
    let value = value.to_lowercase();
    if ["outofstock", "out of stock", "soldout", "sold out", "discontinued"]
        .iter()
        .any(|s| value.contains(s))
    {
        Some(Availability::OutOfStock)
    } else if value.contains("instock") || value.contains("in stock") {
        Some(Availability::InStock)
    } else {
        None
    }
}

/// Returns `true` if the page says the product cannot be bought.
///
/// Structured availability (JSON-LD, meta tags, `itemprop`) is checked
/// first and an explicit in-stock signal there is final. Otherwise any
/// out-of-stock wording in the page text or class names marks the product
/// unavailable. Pages with no signal at all are treated as in stock.
#[must_use]
pub fn is_out_of_stock(html: &str) -> bool {
    let document = Html::parse_document(html);

    let structured: Vec<Availability> = jsonld::availabilities(&jsonld::json_ld_blocks(html))
        .iter()
        .filter_map(|value| classify(value))
        .chain(document.select(&AVAILABILITY_META).filter_map(|el| {
            let value = el.value();
            value
                .attr("content")
                .or_else(|| value.attr("href"))
                .and_then(classify)
        }))
        .collect();

    if structured.contains(&Availability::InStock) {
        return false;
    }
    if structured.contains(&Availability::OutOfStock) {
        tracing::debug!("structured data marks product out of stock");
        return true;
    }

    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    if OUT_OF_STOCK_TEXT.is_match(&text) {
        tracing::debug!("page text marks product out of stock");
        return true;
    }

    document
        .select(&WITH_CLASS)
        .filter_map(|el| el.value().attr("class"))
        .any(|class| OUT_OF_STOCK_CLASS.is_match(class))
}
