//! Validated, index-based view of a plan request, ready to hand to the solver.

use std::collections::{BTreeMap, BTreeSet};

use dealcrawl_core::{Offer, ShippingConfig};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::OptimizerError;
use crate::types::{OptimizeMode, OptimizerConfig, PlanRequest};

/// Upper bound on the sum of tie-break perturbations in the objective; well
/// below the smallest currency unit.
const TIE_BREAK_BUDGET: f64 = 1e-3;

#[derive(Debug)]
pub(crate) struct Candidate {
    pub offer: Offer,
    pub product_idx: usize,
    pub store_idx: usize,
    /// Objective coefficient, including the tie-break perturbation.
    pub cost: f64,
    /// Price used for the free-shipping threshold.
    pub price: f64,
}

#[derive(Debug)]
pub(crate) struct StoreTerms {
    pub fee: f64,
    pub free_over: Option<f64>,
}

#[derive(Debug)]
pub(crate) struct ModelInput {
    pub products: Vec<String>,
    pub stores: Vec<String>,
    pub store_terms: Vec<StoreTerms>,
    pub candidates: Vec<Candidate>,
}

impl ModelInput {
    /// Validates the request and lays it out in a canonical order so that
    /// identical inputs always produce identical models.
    pub(crate) fn build(
        request: &PlanRequest,
        shipping: &ShippingConfig,
        mode: OptimizeMode,
        config: &OptimizerConfig,
    ) -> Result<Self, OptimizerError> {
        let products: Vec<String> = request
            .products
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut offers: Vec<&Offer> = Vec::with_capacity(request.offers.len());
        for offer in &request.offers {
            if products.binary_search(&offer.product).is_err() {
                tracing::debug!(
                    product = %offer.product,
                    store = %offer.store,
                    "ignoring offer for a product that was not requested"
                );
                continue;
            }
            validate_offer(offer)?;
            offers.push(offer);
        }

        let covered: BTreeSet<&str> = offers.iter().map(|o| o.product.as_str()).collect();
        let missing: Vec<String> = products
            .iter()
            .filter(|p| !covered.contains(p.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(OptimizerError::Infeasible { products: missing });
        }

        offers.sort_by(|a, b| {
            (&a.product, &a.store, &a.size_label, &a.url, a.price)
                .cmp(&(&b.product, &b.store, &b.size_label, &b.url, b.price))
        });

        let stores: Vec<String> = offers
            .iter()
            .map(|o| o.store.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let store_index: BTreeMap<&str, usize> = stores
            .iter()
            .enumerate()
            .map(|(idx, store)| (store.as_str(), idx))
            .collect();

        let store_terms = stores
            .iter()
            .map(|store| {
                let rule = shipping.rule_for(store);
                Ok(StoreTerms {
                    fee: to_f64(rule.fee)?,
                    free_over: rule.free_over.map(to_f64).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, OptimizerError>>()?;

        #[allow(clippy::cast_precision_loss)]
        let tie_step = TIE_BREAK_BUDGET / (offers.len() as f64 + 1.0);

        let mut candidates = Vec::with_capacity(offers.len());
        for (rank, offer) in offers.into_iter().enumerate() {
            let product_idx = products
                .binary_search(&offer.product)
                .map_err(|_| OptimizerError::Solver("offer lost its product".to_string()))?;
            let store_idx = *store_index
                .get(offer.store.as_str())
                .ok_or_else(|| OptimizerError::Solver("offer lost its store".to_string()))?;
            let price = to_f64(offer.price)?;
            #[allow(clippy::cast_precision_loss)]
            let cost = objective_cost(offer, mode, config)? + rank as f64 * tie_step;
            candidates.push(Candidate {
                offer: offer.clone(),
                product_idx,
                store_idx,
                cost,
                price,
            });
        }

        tracing::debug!(
            products = products.len(),
            stores = stores.len(),
            offers = candidates.len(),
            %mode,
            "built optimization model"
        );

        Ok(Self {
            products,
            stores,
            store_terms,
            candidates,
        })
    }
}

fn validate_offer(offer: &Offer) -> Result<(), OptimizerError> {
    let reason = if offer.price <= Decimal::ZERO {
        Some(format!("price must be positive, got {}", offer.price))
    } else if !offer.in_stock {
        Some("offer is out of stock".to_string())
    } else if offer.size_label.trim().is_empty() {
        Some("size label is empty".to_string())
    } else if offer.unit_volume_ml.is_some_and(|v| v <= Decimal::ZERO) {
        Some("unit volume must be positive".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(OptimizerError::InvalidOffer {
            product: offer.product.clone(),
            store: offer.store.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Value mode falls back to the plain price for offers of unknown size.
fn objective_cost(
    offer: &Offer,
    mode: OptimizeMode,
    config: &OptimizerConfig,
) -> Result<f64, OptimizerError> {
    match (mode, offer.price_per_100ml()) {
        (OptimizeMode::MaximizeValue, Some(per_100ml)) => {
            Ok(to_f64(per_100ml)? * config.value_scale)
        }
        _ => to_f64(offer.price),
    }
}

fn to_f64(value: Decimal) -> Result<f64, OptimizerError> {
    value
        .to_f64()
        .ok_or_else(|| OptimizerError::Solver(format!("{value} is not representable as f64")))
}
