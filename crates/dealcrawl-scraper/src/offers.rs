//! Turns collected prices into the offer table the optimizer consumes.

use std::collections::BTreeSet;

use dealcrawl_core::{base_product_name, parse_volume, Offer, PriceBounds};

use crate::collect::Collection;

/// Currency of every scraped price; all supported stores price in euros.
pub const CURRENCY: &str = "EUR";

/// Builds one [`Offer`] per observation.
///
/// The offer's product is the family name, so that every size of a product
/// competes for the same slot in the plan. The size label comes from the
/// configured name, or is the full name when it carries no size. Prices
/// outside `bounds` are dropped. Out-of-stock pages never produce an
/// observation, so every offer is in stock.
#[must_use]
pub fn build_offers(collection: &Collection, bounds: PriceBounds) -> Vec<Offer> {
    collection
        .observations
        .iter()
        .filter(|obs| {
            let keep = bounds.contains(obs.price);
            if !keep {
                tracing::debug!(url = %obs.url, price = %obs.price, "dropping out-of-range price");
            }
            keep
        })
        .map(|obs| {
            let volume = parse_volume(&obs.product);
            Offer {
                product: base_product_name(&obs.product),
                store: obs.store.clone(),
                size_label: volume.map_or_else(|| obs.product.clone(), |v| v.label()),
                unit_volume_ml: volume.map(|v| v.total_ml()),
                price: obs.price,
                currency: CURRENCY.to_string(),
                url: obs.url.clone(),
                in_stock: true,
            }
        })
        .collect()
}

/// Family names to plan for, in first-seen order.
///
/// Families whose URLs all failed are included, so the optimizer reports
/// them as unsatisfiable rather than silently leaving them out.
#[must_use]
pub fn requested_products(collection: &Collection) -> Vec<String> {
    let mut seen = BTreeSet::new();
    collection
        .products
        .iter()
        .map(|name| base_product_name(name))
        .filter(|family| seen.insert(family.clone()))
        .collect()
}
