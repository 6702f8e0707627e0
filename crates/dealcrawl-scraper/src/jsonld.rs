//! schema.org JSON-LD blocks embedded in product pages.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});

/// Every JSON-LD block on the page that parses as JSON.
pub(crate) fn json_ld_blocks(html: &str) -> Vec<Value> {
    SCRIPT_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
            if raw.is_empty() {
                return None;
            }
            serde_json::from_str::<Value>(raw).ok()
        })
        .collect()
}

/// Raw `price` / `lowPrice` values found under any `offers` node, in
/// document order. Numbers are rendered as strings.
pub(crate) fn offer_prices(blocks: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    for block in blocks {
        collect_offers(block, &mut out);
    }
    out
}

fn collect_offers(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(offers) = map.get("offers") {
                collect_prices(offers, out);
            }
            for (key, child) in map {
                if key != "offers" {
                    collect_offers(child, out);
                }
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_offers(child, out);
            }
        }
        _ => {}
    }
}

fn collect_prices(offers: &Value, out: &mut Vec<String>) {
    match offers {
        Value::Object(map) => {
            for key in ["price", "lowPrice"] {
                match map.get(key) {
                    Some(Value::String(s)) => out.push(s.clone()),
                    Some(Value::Number(n)) => out.push(n.to_string()),
                    _ => {}
                }
            }
            // AggregateOffer nests the individual offers again.
            if let Some(nested) = map.get("offers") {
                collect_prices(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_prices(item, out);
            }
        }
        _ => {}
    }
}

/// Every `availability` string anywhere in the blocks, lowercased.
pub(crate) fn availabilities(blocks: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    for block in blocks {
        collect_availability(block, &mut out);
    }
    out
}

fn collect_availability(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("availability") {
                out.push(s.to_lowercase());
            }
            for child in map.values() {
                collect_availability(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_availability(child, out);
            }
        }
        _ => {}
    }
}
