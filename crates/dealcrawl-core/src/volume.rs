//! Size parsing for product names such as `"Cerave Foaming Cleanser (2x236ml)"`.
//!
//! The configured product name is the only source of size information; the
//! scraped page is never consulted for it.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static MULTI_PACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((\d+)x(\d+(?:\.\d+)?)ml\)").expect("valid multi-pack volume regex")
});

static SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((\d+(?:\.\d+)?)ml\)").expect("valid volume regex"));

static SIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\d+(?:x\d+)?(?:\.\d+)?ml\)\s*$").expect("valid size suffix regex")
});

/// Pack size parsed from a product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// Volume of one unit in millilitres.
    pub per_unit_ml: Decimal,
    /// Number of units in the pack; `1` for single items.
    pub quantity: u32,
}

impl Volume {
    #[must_use]
    pub fn total_ml(&self) -> Decimal {
        self.per_unit_ml * Decimal::from(self.quantity)
    }

    /// Short label used as the size descriptor of an offer, e.g. `"236ml"`
    /// or `"2x236ml (472ml)"`.
    #[must_use]
    pub fn label(&self) -> String {
        let per_unit = self.per_unit_ml.normalize();
        if self.quantity == 1 {
            format!("{per_unit}ml")
        } else {
            format!(
                "{}x{per_unit}ml ({}ml)",
                self.quantity,
                self.total_ml().normalize()
            )
        }
    }
}

/// Parses `(236ml)` or `(2x236ml)` out of a product name.
///
/// Returns `None` when the name carries no size, or when the size is zero.
#[must_use]
pub fn parse_volume(product_name: &str) -> Option<Volume> {
    if let Some(caps) = MULTI_PACK_RE.captures(product_name) {
        let quantity = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let per_unit_ml = caps.get(2)?.as_str().parse::<Decimal>().ok()?;
        return non_empty(Volume {
            per_unit_ml,
            quantity,
        });
    }

    let caps = SINGLE_RE.captures(product_name)?;
    let per_unit_ml = caps.get(1)?.as_str().parse::<Decimal>().ok()?;
    non_empty(Volume {
        per_unit_ml,
        quantity: 1,
    })
}

fn non_empty(volume: Volume) -> Option<Volume> {
    (volume.quantity > 0 && volume.per_unit_ml > Decimal::ZERO).then_some(volume)
}

/// Strips a trailing size suffix so that every size of a product maps to
/// the same family name.
///
/// `"Cerave Foaming Cleanser (236ml)"` → `"Cerave Foaming Cleanser"`.
#[must_use]
pub fn base_product_name(product_name: &str) -> String {
    SIZE_SUFFIX_RE
        .replace(product_name, "")
        .trim()
        .to_string()
}

/// Price per 100 ml, rounded to four decimal places.
///
/// Returns `None` for a non-positive volume.
#[must_use]
pub fn price_per_100ml(price: Decimal, total_ml: Decimal) -> Option<Decimal> {
    if total_ml <= Decimal::ZERO {
        return None;
    }
    Some((price / total_ml * Decimal::ONE_HUNDRED).round_dp(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn parses_single_volume() {
        let volume = parse_volume("Cerave Foaming Cleanser (236ml)").unwrap();
        assert_eq!(volume.per_unit_ml, dec("236"));
        assert_eq!(volume.quantity, 1);
        assert_eq!(volume.total_ml(), dec("236"));
    }

    #[test]
    fn parses_multi_pack() {
        let volume = parse_volume("Cerave Foaming Cleanser (2x236ml)").unwrap();
        assert_eq!(volume.per_unit_ml, dec("236"));
        assert_eq!(volume.quantity, 2);
        assert_eq!(volume.total_ml(), dec("472"));
    }

    #[test]
    fn parses_decimal_volume_case_insensitive() {
        let volume = parse_volume("Serum (7.5ML)").unwrap();
        assert_eq!(volume.per_unit_ml, dec("7.5"));
    }

    #[test]
    fn no_volume_in_name() {
        assert!(parse_volume("Cerave Foaming Cleanser").is_none());
    }

    #[test]
    fn zero_volume_is_ignored() {
        assert!(parse_volume("Sample (0ml)").is_none());
        assert!(parse_volume("Sample (0x50ml)").is_none());
    }

    #[test]
    fn label_single_and_multi() {
        assert_eq!(parse_volume("A (236ml)").unwrap().label(), "236ml");
        assert_eq!(
            parse_volume("A (2x236ml)").unwrap().label(),
            "2x236ml (472ml)"
        );
    }

    #[test]
    fn base_name_strips_size_suffix() {
        assert_eq!(
            base_product_name("Cerave Foaming Cleanser (236ml)"),
            "Cerave Foaming Cleanser"
        );
        assert_eq!(
            base_product_name("Cerave Foaming Cleanser (2x236ml)"),
            "Cerave Foaming Cleanser"
        );
    }

    #[test]
    fn base_name_keeps_unsized_name() {
        assert_eq!(base_product_name("Sunscreen SPF50"), "Sunscreen SPF50");
    }

    #[test]
    fn base_name_only_strips_trailing_suffix() {
        assert_eq!(
            base_product_name("Kit (100ml) Travel Edition"),
            "Kit (100ml) Travel Edition"
        );
    }

    #[test]
    fn price_per_100ml_basic() {
        assert_eq!(price_per_100ml(dec("20.00"), dec("100")), Some(dec("20")));
        assert_eq!(price_per_100ml(dec("40.00"), dec("250")), Some(dec("16")));
    }

    #[test]
    fn price_per_100ml_rejects_zero_volume() {
        assert!(price_per_100ml(dec("10"), Decimal::ZERO).is_none());
    }
}
