use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::volume::price_per_100ml;

/// One purchasable (product, store, size) combination.
///
/// Offers are rebuilt from scraped or cached pages on every run and are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Product family name, without any size suffix.
    pub product: String,
    /// Store domain, e.g. `"notino.pt"`.
    pub store: String,
    /// Size descriptor, e.g. `"236ml"`. Products without a size use the
    /// configured product name.
    pub size_label: String,
    /// Total volume in millilitres, when the size is known.
    pub unit_volume_ml: Option<Decimal>,
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub url: String,
    pub in_stock: bool,
}

impl Offer {
    #[must_use]
    pub fn price_per_100ml(&self) -> Option<Decimal> {
        self.unit_volume_ml
            .and_then(|volume| price_per_100ml(self.price, volume))
    }
}
