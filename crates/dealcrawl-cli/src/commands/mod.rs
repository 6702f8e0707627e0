//! Command handlers for the CLI.
//!
//! `prices` and `plan` load and filter the products file, collect prices
//! through a shared page client, then render a report to stdout. `analyze`
//! works offline from dumped history. Logs go to stderr.

mod analyze;
mod plan;
mod prices;

use std::time::Duration;

use anyhow::Context;
use dealcrawl_core::{filter_by_products, filter_by_sites, load_products, AppConfig, ProductsFile};
use dealcrawl_scraper::{ClientOptions, HttpCache, PageClient};

pub(crate) use analyze::run_analyze;
pub(crate) use plan::{run_plan, PlanOptions};
pub(crate) use prices::{run_prices, PricesOptions};

/// Loads the products file and narrows it to the requested sites and
/// product names. Empty filters keep everything.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, is empty, or a filter
/// leaves nothing to check.
pub(crate) fn load_filtered_products(
    config: &AppConfig,
    sites: &[String],
    products: &[String],
) -> anyhow::Result<ProductsFile> {
    let mut file = load_products(&config.products_path).with_context(|| {
        format!(
            "failed to load products from {}",
            config.products_path.display()
        )
    })?;
    if file.is_empty() {
        anyhow::bail!("no products to compare in {}", config.products_path.display());
    }

    if !sites.is_empty() {
        file = filter_by_sites(&file, sites);
        if file.is_empty() {
            anyhow::bail!("no products found for sites: {}", sites.join(", "));
        }
    }

    if !products.is_empty() {
        file = filter_by_products(&file, products);
        if file.is_empty() {
            anyhow::bail!("no products matching: {}", products.join(", "));
        }
    }

    tracing::debug!(products = file.len(), urls = file.url_count(), "products selected");
    Ok(file)
}

/// Builds the page client, with the on-disk cache unless `no_cache` is set.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub(crate) fn build_client(config: &AppConfig, no_cache: bool) -> anyhow::Result<PageClient> {
    let cache = if no_cache {
        None
    } else {
        let cache = HttpCache::new(
            config.cache_path.clone(),
            Duration::from_secs(config.cache_duration_secs),
        );
        let pruned = cache.clear_expired();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped expired cache entries");
        }
        Some(cache)
    };

    PageClient::new(ClientOptions::from_config(config), cache)
        .context("failed to build page client")
}
