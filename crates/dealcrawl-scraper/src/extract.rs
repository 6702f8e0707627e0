//! Generic price extraction from product page HTML.
//!
//! Strategies run from most to least structured; the first candidate that
//! parses and falls strictly inside the configured price bounds wins.

use std::sync::LazyLock;

use dealcrawl_core::PriceBounds;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

use crate::jsonld;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[,.]?\d{0,2})").expect("valid price number regex"));

static TEXT_PRICE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"€\s*(\d+[.,]\d{2})").expect("valid euro prefix regex"),
        Regex::new(r"(\d+[.,]\d{2})\s*€").expect("valid euro suffix regex"),
        Regex::new(r"EUR\s*(\d+[.,]\d{2})").expect("valid EUR code regex"),
    ]
});

static META_PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"meta[property="product:price:amount"]"#,
        r#"meta[property="og:price:amount"]"#,
        r#"meta[name="price"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid meta price selector"))
    .collect()
});

static ITEMPROP_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="price"]"#).expect("valid itemprop selector"));

static DATA_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-price]").expect("valid data-price selector"));

/// Parses the first number in a price string, accepting either `,` or `.`
/// as the decimal separator: `"29,99 €"`, `"€29.99"` and `"29.99"` all give
/// `29.99`.
#[must_use]
pub fn parse_price_string(raw: &str) -> Option<Decimal> {
    let number = NUMBER_RE.captures(raw)?.get(1)?.as_str();
    number.replace(',', ".").parse::<Decimal>().ok()
}

/// Extracts the product price from a page, or `None` when no strategy
/// yields an in-bounds price.
#[must_use]
pub fn extract_price(html: &str, bounds: PriceBounds) -> Option<Decimal> {
    let document = Html::parse_document(html);
    let accept = |raw: &str| parse_price_string(raw).filter(|price| bounds.contains(*price));

    let from_meta = || {
        META_PRICE_SELECTORS.iter().find_map(|selector| {
            document
                .select(selector)
                .filter_map(|el| el.value().attr("content"))
                .find_map(accept)
        })
    };

    let from_json_ld = || {
        jsonld::offer_prices(&jsonld::json_ld_blocks(html))
            .iter()
            .find_map(|raw| accept(raw.as_str()))
    };

    let from_itemprop = || {
        document.select(&ITEMPROP_PRICE).find_map(|el| {
            el.value()
                .attr("content")
                .and_then(accept)
                .or_else(|| accept(el.text().collect::<String>().trim()))
        })
    };

    let from_data_attribute = || {
        document
            .select(&DATA_PRICE)
            .filter_map(|el| el.value().attr("data-price"))
            .find_map(accept)
    };

    let from_text = || {
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        TEXT_PRICE_RES.iter().find_map(|re| {
            re.captures_iter(&text)
                .filter_map(|cap| cap.get(1))
                .find_map(|m| accept(m.as_str()))
        })
    };

    let price = from_meta()
        .or_else(from_json_ld)
        .or_else(from_itemprop)
        .or_else(from_data_attribute)
        .or_else(from_text);

    if price.is_none() {
        tracing::debug!("no in-bounds price found on page");
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    fn bounds() -> PriceBounds {
        PriceBounds::default()
    }

    #[test]
    fn parses_common_price_formats() {
        assert_eq!(parse_price_string("29,99 €"), Some(dec("29.99")));
        assert_eq!(parse_price_string("€29.99"), Some(dec("29.99")));
        assert_eq!(parse_price_string("29.99"), Some(dec("29.99")));
        assert_eq!(parse_price_string("EUR 7"), Some(dec("7")));
    }

    #[test]
    fn takes_first_number_only() {
        assert_eq!(parse_price_string("12,50 € 15,00 €"), Some(dec("12.50")));
    }

    #[test]
    fn rejects_text_without_digits() {
        assert_eq!(parse_price_string("sem preço"), None);
        assert_eq!(parse_price_string(""), None);
    }

    #[test]
    fn meta_tag_wins_over_other_strategies() {
        let html = r#"<html><head>
<meta property="product:price:amount" content="18.45">
</head><body><span data-price="99.00"></span><p>€ 50,00</p></body></html>"#;
        assert_eq!(extract_price(html, bounds()), Some(dec("18.45")));
    }

    #[test]
    fn out_of_bounds_meta_falls_through() {
        let html = r#"<html><head>
<meta property="og:price:amount" content="0.00">
</head><body><span data-price="12,30"></span></body></html>"#;
        assert_eq!(extract_price(html, bounds()), Some(dec("12.30")));
    }

    #[test]
    fn json_ld_offer_price() {
        let html = r#"<html><head><script type="application/ld+json">
{"@type":"Product","offers":{"price":"21.90","priceCurrency":"EUR"}}
</script></head><body></body></html>"#;
        assert_eq!(extract_price(html, bounds()), Some(dec("21.90")));
    }

    #[test]
    fn itemprop_content_and_text() {
        let html = r#"<div><span itemprop="price" content="14.20">14,20 €</span></div>"#;
        assert_eq!(extract_price(html, bounds()), Some(dec("14.20")));
        let html = r#"<div><span itemprop="price">9,95</span></div>"#;
        assert_eq!(extract_price(html, bounds()), Some(dec("9.95")));
    }

    #[test]
    fn text_patterns_as_last_resort() {
        let html = "<html><body><p>Preço: 24,99 €</p></body></html>";
        assert_eq!(extract_price(html, bounds()), Some(dec("24.99")));
        let html = "<html><body><p>Now EUR 31.50 only</p></body></html>";
        assert_eq!(extract_price(html, bounds()), Some(dec("31.50")));
    }

    #[test]
    fn text_pattern_skips_out_of_bounds_matches() {
        let html = "<html><body><p>Portes € 0,99</p><p>Preço € 19,99</p></body></html>";
        assert_eq!(extract_price(html, bounds()), Some(dec("19.99")));
    }

    #[test]
    fn no_price_on_page() {
        let html = "<html><body><h1>Cleanser</h1></body></html>";
        assert_eq!(extract_price(html, bounds()), None);
    }

    #[test]
    fn respects_custom_bounds() {
        let html = r#"<meta name="price" content="5.00">"#;
        let tight = PriceBounds {
            min: dec("10"),
            max: dec("100"),
        };
        assert_eq!(extract_price(html, tight), None);
    }
}
