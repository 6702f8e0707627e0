use std::collections::BTreeMap;

use dealcrawl_core::{Offer, ShippingConfig};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::OptimizeMode;

/// Everything bought from a single store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreOrder {
    pub store: String,
    /// Chosen offers, sorted by product.
    pub items: Vec<Offer>,
    pub subtotal: Decimal,
    /// Shipping actually paid: zero when the threshold was met.
    pub shipping_fee: Decimal,
    pub threshold_met: bool,
    /// The store's free-shipping threshold, if it has one.
    pub free_over: Option<Decimal>,
    pub total: Decimal,
}

/// An optimal shopping plan: one offer per requested product, grouped into
/// per-store orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub mode: OptimizeMode,
    /// Chosen offer keyed by product name.
    pub selections: BTreeMap<String, Offer>,
    /// Orders for stores with at least one item, sorted by store.
    pub orders: Vec<StoreOrder>,
}

impl Plan {
    pub(crate) fn empty(mode: OptimizeMode) -> Self {
        Self {
            mode,
            selections: BTreeMap::new(),
            orders: Vec::new(),
        }
    }

    /// Groups the selected offers by store and prices each order in exact
    /// decimal arithmetic.
    pub(crate) fn from_selections(
        mode: OptimizeMode,
        selections: BTreeMap<String, Offer>,
        shipping: &ShippingConfig,
    ) -> Self {
        let mut by_store: BTreeMap<&str, Vec<Offer>> = BTreeMap::new();
        for offer in selections.values() {
            by_store
                .entry(offer.store.as_str())
                .or_default()
                .push(offer.clone());
        }

        let orders = by_store
            .into_iter()
            .map(|(store, items)| {
                let rule = shipping.rule_for(store);
                let subtotal: Decimal = items.iter().map(|o| o.price).sum();
                let shipping_fee = rule.shipping_for(subtotal);
                StoreOrder {
                    store: store.to_string(),
                    items,
                    subtotal,
                    shipping_fee,
                    threshold_met: rule.is_free_for(subtotal),
                    free_over: rule.free_over,
                    total: subtotal + shipping_fee,
                }
            })
            .collect();

        Self {
            mode,
            selections,
            orders,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.orders.iter().map(|o| o.total).sum()
    }

    #[must_use]
    pub fn total_shipping(&self) -> Decimal {
        self.orders.iter().map(|o| o.shipping_fee).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn store_count(&self) -> usize {
        self.orders.len()
    }
}
