use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ConfigError;

/// Flat fee charged by stores missing from the shipping file.
pub const DEFAULT_SHIPPING_FEE: Decimal = Decimal::from_parts(399, 0, 0, false, 2);

/// A store's shipping terms: a flat fee, waived once the order subtotal
/// reaches `free_over`.
///
/// `free_over == Some(0)` means shipping is always free; `None` means no
/// order is large enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRule {
    pub fee: Decimal,
    pub free_over: Option<Decimal>,
}

impl ShippingRule {
    /// Returns `true` when an order of `subtotal` ships for free.
    #[must_use]
    pub fn is_free_for(&self, subtotal: Decimal) -> bool {
        self.free_over
            .is_some_and(|threshold| subtotal >= threshold)
    }

    /// Shipping charged for an order of `subtotal`.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if self.is_free_for(subtotal) {
            Decimal::ZERO
        } else {
            self.fee
        }
    }
}

impl Default for ShippingRule {
    fn default() -> Self {
        Self {
            fee: DEFAULT_SHIPPING_FEE,
            free_over: None,
        }
    }
}

/// Shipping rules keyed by store domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingConfig {
    stores: BTreeMap<String, ShippingRule>,
}

impl ShippingConfig {
    #[must_use]
    pub fn new(stores: BTreeMap<String, ShippingRule>) -> Self {
        Self { stores }
    }

    /// Rule for `store`, or [`ShippingRule::default`] for unknown stores.
    #[must_use]
    pub fn rule_for(&self, store: &str) -> ShippingRule {
        self.stores.get(store).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, store: impl Into<String>, rule: ShippingRule) {
        self.stores.insert(store.into(), rule);
    }
}

#[derive(Debug, Deserialize)]
struct ShippingEntry {
    site: String,
    shipping: Decimal,
    #[serde(rename = "free-over")]
    free_over: Option<Decimal>,
}

/// Load and validate shipping rules from a YAML file.
///
/// The file is a list of `{ site, shipping, free-over }` entries. Omitting
/// `free-over` means the store never ships for free.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_shipping(path: &Path) -> Result<ShippingConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_shipping(&content, &path.display().to_string())
}

fn parse_shipping(content: &str, origin: &str) -> Result<ShippingConfig, ConfigError> {
    let entries: Option<Vec<ShippingEntry>> =
        serde_yaml::from_str(content).map_err(|e| ConfigError::FileParse {
            path: origin.to_string(),
            source: e,
        })?;
    let Some(entries) = entries else {
        return Err(ConfigError::Validation(format!(
            "{origin} is empty; expected a list of shipping entries"
        )));
    };

    let mut stores = BTreeMap::new();
    for entry in entries {
        let site = entry.site.trim().to_lowercase();
        if site.is_empty() {
            return Err(ConfigError::Validation(
                "shipping entry has an empty site".to_string(),
            ));
        }
        if entry.shipping < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "invalid shipping cost for '{site}': {}; must be >= 0",
                entry.shipping
            )));
        }
        if let Some(threshold) = entry.free_over {
            if threshold < Decimal::ZERO {
                return Err(ConfigError::Validation(format!(
                    "invalid free shipping threshold for '{site}': {threshold}; must be >= 0"
                )));
            }
        }
        let rule = ShippingRule {
            fee: entry.shipping,
            free_over: entry.free_over,
        };
        if stores.insert(site.clone(), rule).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate shipping entry for '{site}'"
            )));
        }
    }

    Ok(ShippingConfig::new(stores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn shipping_below_threshold_charges_fee() {
        let rule = ShippingRule {
            fee: dec("3.50"),
            free_over: Some(dec("40.00")),
        };
        assert_eq!(rule.shipping_for(dec("25.00")), dec("3.50"));
        assert!(!rule.is_free_for(dec("25.00")));
    }

    #[test]
    fn shipping_at_threshold_is_free() {
        let rule = ShippingRule {
            fee: dec("3.50"),
            free_over: Some(dec("40.00")),
        };
        assert_eq!(rule.shipping_for(dec("40.00")), Decimal::ZERO);
    }

    #[test]
    fn zero_threshold_is_always_free() {
        let rule = ShippingRule {
            fee: dec("3.50"),
            free_over: Some(Decimal::ZERO),
        };
        assert_eq!(rule.shipping_for(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(rule.shipping_for(dec("0.01")), Decimal::ZERO);
    }

    #[test]
    fn missing_threshold_is_never_free() {
        let rule = ShippingRule {
            fee: dec("4.99"),
            free_over: None,
        };
        assert_eq!(rule.shipping_for(dec("10000")), dec("4.99"));
    }

    #[test]
    fn unknown_store_gets_default_rule() {
        let config = ShippingConfig::default();
        let rule = config.rule_for("unknown.example");
        assert_eq!(rule.fee, dec("3.99"));
        assert!(rule.free_over.is_none());
    }

    #[test]
    fn parses_shipping_file() {
        let yaml = r"
- site: notino.pt
  shipping: 3.50
  free-over: 40
- site: Wells.pt
  shipping: 2.99
- site: free.example
  shipping: 5
  free-over: 0
";
        let config = parse_shipping(yaml, "shipping.yaml").unwrap();
        assert_eq!(
            config.rule_for("notino.pt"),
            ShippingRule {
                fee: dec("3.50"),
                free_over: Some(dec("40")),
            }
        );
        assert_eq!(config.rule_for("wells.pt").free_over, None);
        assert_eq!(config.rule_for("free.example").shipping_for(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn rejects_negative_fee() {
        let yaml = "- site: a.pt\n  shipping: -1\n  free-over: 10\n";
        let err = parse_shipping(yaml, "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("a.pt")));
    }

    #[test]
    fn rejects_negative_threshold() {
        let yaml = "- site: a.pt\n  shipping: 1\n  free-over: -10\n";
        let err = parse_shipping(yaml, "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_site() {
        let yaml = "- site: a.pt\n  shipping: 1\n- site: A.pt\n  shipping: 2\n";
        let err = parse_shipping(yaml, "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_missing_required_field() {
        let yaml = "- site: a.pt\n  free-over: 10\n";
        let err = parse_shipping(yaml, "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileParse { .. }));
    }

    #[test]
    fn rejects_non_list_root() {
        let yaml = "notino.pt: 3.5\n";
        let err = parse_shipping(yaml, "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileParse { .. }));
    }

    #[test]
    fn rejects_empty_file() {
        let err = parse_shipping("", "shipping.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_shipping_reports_missing_file() {
        let err = load_shipping(Path::new("/nonexistent/shipping.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileIo { .. }));
    }

    #[test]
    fn load_shipping_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipping.yaml");
        std::fs::write(&path, "- site: a.pt\n  shipping: 2\n  free-over: 30\n").unwrap();
        let config = load_shipping(&path).unwrap();
        let rule = config.rule_for("a.pt");
        assert_eq!(rule.fee, dec("2"));
        assert_eq!(rule.free_over, Some(dec("30")));
    }
}
