use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizerError {
    /// At least one requested product has no usable offer.
    #[error("no feasible plan: no in-stock offers for {}", .products.join(", "))]
    Infeasible { products: Vec<String> },

    /// The solver produced no proven-optimal answer within the time limit.
    #[error("solver did not finish within {limit:?}")]
    SolverTimeout { limit: Duration },

    #[error("invalid offer for '{product}' at {store}: {reason}")]
    InvalidOffer {
        product: String,
        store: String,
        reason: String,
    },

    #[error("solver failure: {0}")]
    Solver(String),
}
