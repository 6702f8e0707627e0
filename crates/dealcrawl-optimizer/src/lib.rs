//! Multi-store shopping plan optimizer.
//!
//! Chooses exactly one offer per requested product and routes each purchase
//! to a store so that the total spend (or the per-unit cost, in value mode)
//! is minimal once threshold-triggered free shipping is taken into account.
//! The choice is modelled as a small mixed-integer linear program and handed
//! to [`good_lp`].

pub mod error;
mod model;
pub mod optimizer;
pub mod plan;
mod solve;
pub mod types;

pub use error::OptimizerError;
pub use optimizer::ShoppingOptimizer;
pub use plan::{Plan, StoreOrder};
pub use types::{OptimizeMode, OptimizerConfig, PlanRequest};
