use std::path::PathBuf;

use anyhow::Context;
use dealcrawl_core::{load_shipping, AppConfig};
use dealcrawl_optimizer::{OptimizeMode, OptimizerConfig, PlanRequest, ShoppingOptimizer};
use dealcrawl_scraper::{build_offers, collect_prices, requested_products};

use crate::dump;
use crate::report::{self, OutputFormat};

#[derive(Debug)]
pub(crate) struct PlanOptions {
    pub(crate) products: Vec<String>,
    pub(crate) sites: Vec<String>,
    pub(crate) optimize_for_value: bool,
    pub(crate) no_cache: bool,
    pub(crate) format: OutputFormat,
    pub(crate) dump: Option<PathBuf>,
}

impl PlanOptions {
    fn mode(&self) -> OptimizeMode {
        if self.optimize_for_value {
            OptimizeMode::MaximizeValue
        } else {
            OptimizeMode::MinimizeCost
        }
    }
}

/// Collects prices for the requested products and prints the optimal
/// multi-store shopping plan.
///
/// Every size of a product competes for the same slot in the plan, so the
/// optimizer picks exactly one size per product family.
///
/// # Errors
///
/// Returns an error if the products or shipping file cannot be loaded, no
/// product matches, the optimizer fails (for example when a requested
/// product has no in-stock offer), or the dump file cannot be written.
pub(crate) async fn run_plan(config: &AppConfig, options: &PlanOptions) -> anyhow::Result<()> {
    let products = super::load_filtered_products(config, &options.sites, &options.products)?;
    let shipping = load_shipping(&config.shipping_path).with_context(|| {
        format!(
            "failed to load shipping rules from {}",
            config.shipping_path.display()
        )
    })?;
    let client = super::build_client(config, options.no_cache)?;

    let collection = collect_prices(&products, &client, config.price_bounds).await;
    let request = PlanRequest::new(
        requested_products(&collection),
        build_offers(&collection, config.price_bounds),
    );

    let mode = options.mode();
    tracing::info!(
        products = request.products.len(),
        offers = request.offers.len(),
        %mode,
        "optimizing shopping plan"
    );

    let optimizer =
        ShoppingOptimizer::new(OptimizerConfig::with_time_limit(config.solver_time_limit()));
    let plan = optimizer
        .optimize(&request, &shipping, mode)
        .context("could not build a shopping plan")?;

    print!("{}", report::render_plan(&plan, options.format));

    if let Some(path) = &options.dump {
        dump::write_plan(path, &plan)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Plan dumped to {}", path.display());
    }

    Ok(())
}
