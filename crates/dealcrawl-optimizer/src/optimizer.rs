use std::collections::BTreeMap;
use std::sync::Arc;

use dealcrawl_core::ShippingConfig;

use crate::error::OptimizerError;
use crate::model::ModelInput;
use crate::plan::Plan;
use crate::solve::solve_with_limit;
use crate::types::{OptimizeMode, OptimizerConfig, PlanRequest};

/// Finds the cheapest (or best-value) way to buy a set of products across
/// stores with threshold-based free shipping.
#[derive(Debug, Clone, Default)]
pub struct ShoppingOptimizer {
    config: OptimizerConfig,
}

impl ShoppingOptimizer {
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Computes a proven-optimal plan for `request`.
    ///
    /// Ties between equally cheap plans are broken deterministically, so the
    /// same inputs always yield the same plan. An empty product list yields
    /// an empty plan.
    ///
    /// # Errors
    ///
    /// - [`OptimizerError::InvalidOffer`] if an offer for a requested product
    ///   is out of stock, has a non-positive price, an empty size label, or
    ///   a non-positive volume.
    /// - [`OptimizerError::Infeasible`] if a requested product has no offers;
    ///   every such product is named.
    /// - [`OptimizerError::SolverTimeout`] if the solver exceeds the
    ///   configured time limit.
    /// - [`OptimizerError::Solver`] for any other solver failure.
    pub fn optimize(
        &self,
        request: &PlanRequest,
        shipping: &ShippingConfig,
        mode: OptimizeMode,
    ) -> Result<Plan, OptimizerError> {
        let model = ModelInput::build(request, shipping, mode, &self.config)?;
        if model.products.is_empty() {
            tracing::debug!("no products requested; returning empty plan");
            return Ok(Plan::empty(mode));
        }

        let model = Arc::new(model);
        let selected = solve_with_limit(Arc::clone(&model), self.config.time_limit)?;

        let mut selections = BTreeMap::new();
        for idx in selected {
            let candidate = model.candidates.get(idx).ok_or_else(|| {
                OptimizerError::Solver(format!("solver selected unknown offer {idx}"))
            })?;
            if selections
                .insert(candidate.offer.product.clone(), candidate.offer.clone())
                .is_some()
            {
                return Err(OptimizerError::Solver(format!(
                    "solver selected more than one offer for '{}'",
                    candidate.offer.product
                )));
            }
        }
        if selections.len() != model.products.len() {
            return Err(OptimizerError::Solver(format!(
                "solver selected {} offers for {} products",
                selections.len(),
                model.products.len()
            )));
        }

        let plan = Plan::from_selections(mode, selections, shipping);
        tracing::info!(
            %mode,
            items = plan.item_count(),
            stores = plan.store_count(),
            grand_total = %plan.grand_total(),
            shipping = %plan.total_shipping(),
            "shopping plan optimized"
        );
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "optimizer_test.rs"]
mod tests;
