use std::path::PathBuf;

use anyhow::Context;
use dealcrawl_core::AppConfig;
use dealcrawl_scraper::{best_value_sizes, cheapest_per_product, collect_prices};

use crate::dump;
use crate::report::{self, OutputFormat};

#[derive(Debug)]
pub(crate) struct PricesOptions {
    pub(crate) sites: Vec<String>,
    pub(crate) products: Vec<String>,
    pub(crate) all_sizes: bool,
    pub(crate) no_cache: bool,
    pub(crate) format: OutputFormat,
    pub(crate) dump: Option<PathBuf>,
}

/// Finds the cheapest price for every selected product and prints the
/// results followed by a search summary.
///
/// Unless `all_sizes` is set, only the best-value size of each product
/// family is shown.
///
/// # Errors
///
/// Returns an error if the products file cannot be loaded, the filters
/// leave nothing to check, the client cannot be built, or the dump file
/// cannot be written. Unreachable pages are counted, not propagated.
pub(crate) async fn run_prices(config: &AppConfig, options: &PricesOptions) -> anyhow::Result<()> {
    let products = super::load_filtered_products(config, &options.sites, &options.products)?;
    let client = super::build_client(config, options.no_cache)?;

    let collection = collect_prices(&products, &client, config.price_bounds).await;

    let mut results = cheapest_per_product(&collection);
    if !options.all_sizes {
        results = best_value_sizes(results);
    }

    print!("{}", report::render_results(&results, options.format));
    print!("{}", report::render_summary(&collection.stats, options.format));

    if let Some(path) = &options.dump {
        dump::write_results(path, &results)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Results dumped to {}", path.display());
    }

    Ok(())
}
