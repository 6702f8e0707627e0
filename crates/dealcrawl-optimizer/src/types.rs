use std::time::Duration;

use dealcrawl_core::Offer;
use serde::{Deserialize, Serialize};

/// What the optimizer minimizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMode {
    /// Lowest total spend: item prices plus shipping.
    #[default]
    MinimizeCost,
    /// Best value: lowest price per 100 ml, with shipping still counted.
    MaximizeValue,
}

impl std::fmt::Display for OptimizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizeMode::MinimizeCost => write!(f, "minimize_cost"),
            OptimizeMode::MaximizeValue => write!(f, "maximize_value"),
        }
    }
}

/// Solver settings, fixed when the optimizer is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Wall-clock budget for one solve. Exceeding it is a hard failure.
    pub time_limit: Duration,
    /// Multiplier applied to the per-100 ml price in value mode, putting it
    /// on a scale comparable to shipping fees.
    pub value_scale: f64,
}

impl OptimizerConfig {
    #[must_use]
    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_limit,
            ..Self::default()
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            value_scale: 10.0,
        }
    }
}

/// Products to buy and every candidate offer for them.
///
/// Offers must be in stock with a positive price; the optimizer rejects any
/// that are not rather than silently skipping them.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub products: Vec<String>,
    pub offers: Vec<Offer>,
}

impl PlanRequest {
    #[must_use]
    pub fn new(products: Vec<String>, offers: Vec<Offer>) -> Self {
        Self { products, offers }
    }
}
