use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};

use crate::error::OptimizerError;
use crate::model::ModelInput;

/// Runs the solver on a worker thread and gives up after `limit`.
///
/// The worker is detached on timeout; it finishes on its own and its result
/// is dropped.
pub(crate) fn solve_with_limit(
    model: Arc<ModelInput>,
    limit: Duration,
) -> Result<Vec<usize>, OptimizerError> {
    let (tx, rx) = mpsc::channel();
    let worker_model = Arc::clone(&model);
    thread::Builder::new()
        .name("dealcrawl-solver".to_string())
        .spawn(move || {
            tx.send(solve(&worker_model)).ok();
        })
        .map_err(|e| OptimizerError::Solver(format!("failed to spawn solver thread: {e}")))?;

    match rx.recv_timeout(limit) {
        Ok(Ok(selected)) => Ok(selected),
        Ok(Err(ResolutionError::Infeasible)) => Err(OptimizerError::Infeasible {
            products: model.products.clone(),
        }),
        Ok(Err(e)) => Err(OptimizerError::Solver(e.to_string())),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(OptimizerError::SolverTimeout { limit }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(OptimizerError::Solver(
            "solver thread exited without a result".to_string(),
        )),
    }
}

/// Builds and solves the mixed-integer program, returning the indices of
/// the chosen candidates.
///
/// Variables: `buy[o]` per offer, `open[s]` per store, and `free[s]` per
/// store that has a free-shipping threshold. The fee is paid for every open
/// store unless `free[s]` is set, which is only allowed once the store's
/// subtotal reaches the threshold.
fn solve(model: &ModelInput) -> Result<Vec<usize>, ResolutionError> {
    let mut vars = ProblemVariables::new();
    let buy: Vec<Variable> = model
        .candidates
        .iter()
        .map(|_| vars.add(variable().binary()))
        .collect();
    let open: Vec<Variable> = model
        .stores
        .iter()
        .map(|_| vars.add(variable().binary()))
        .collect();
    let free: Vec<Option<Variable>> = model
        .store_terms
        .iter()
        .map(|terms| terms.free_over.map(|_| vars.add(variable().binary())))
        .collect();

    let mut objective: Expression = model
        .candidates
        .iter()
        .zip(&buy)
        .map(|(candidate, &x)| candidate.cost * x)
        .sum();
    for ((terms, &is_open), is_free) in model.store_terms.iter().zip(&open).zip(&free) {
        objective += terms.fee * is_open;
        if let Some(is_free) = *is_free {
            objective += -terms.fee * is_free;
        }
    }

    let mut problem = vars.minimise(objective).using(microlp);

    for product_idx in 0..model.products.len() {
        let picks: Expression = model
            .candidates
            .iter()
            .zip(&buy)
            .filter(|(candidate, _)| candidate.product_idx == product_idx)
            .map(|(_, &x)| x)
            .sum();
        problem = problem.with(constraint!(picks == 1.0));
    }

    for (candidate, &x) in model.candidates.iter().zip(&buy) {
        let is_open = open[candidate.store_idx];
        problem = problem.with(constraint!(x <= is_open));
    }

    for (store_idx, (terms, is_free)) in model.store_terms.iter().zip(&free).enumerate() {
        let (Some(threshold), Some(is_free)) = (terms.free_over, *is_free) else {
            continue;
        };
        let subtotal: Expression = model
            .candidates
            .iter()
            .zip(&buy)
            .filter(|(candidate, _)| candidate.store_idx == store_idx)
            .map(|(candidate, &x)| candidate.price * x)
            .sum();
        let is_open = open[store_idx];
        problem = problem.with(constraint!(is_free <= is_open));
        problem = problem.with(constraint!(subtotal >= threshold * is_free));
    }

    let solution = problem.solve()?;
    Ok(buy
        .iter()
        .enumerate()
        .filter(|(_, &x)| solution.value(x) > 0.5)
        .map(|(idx, _)| idx)
        .collect())
}
