//! Price collection across every configured product URL.

use std::collections::BTreeMap;

use dealcrawl_core::{
    base_product_name, extract_domain, parse_volume, price_per_100ml, PriceBounds, ProductsFile,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::client::PageClient;
use crate::extract::extract_price;
use crate::stock::is_out_of_stock;

/// An in-stock price found on one product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceObservation {
    /// Configured product name, size suffix included.
    pub product: String,
    pub url: String,
    pub store: String,
    pub price: Decimal,
    pub price_per_100ml: Option<Decimal>,
}

/// Counters for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub total_products: usize,
    pub total_urls_checked: usize,
    pub prices_found: usize,
    pub out_of_stock: usize,
    pub fetch_errors: usize,
    pub extraction_errors: usize,
    /// Product name → URLs that reported the product out of stock.
    pub out_of_stock_items: BTreeMap<String, Vec<String>>,
    /// URLs that could not be fetched or yielded no price.
    pub failed_urls: Vec<String>,
}

impl SearchStats {
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.out_of_stock > 0 || self.fetch_errors > 0 || self.extraction_errors > 0
    }
}

/// Everything learned from one pass over the products file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Every configured product name, in file order, whether or not a
    /// price was found for it.
    pub products: Vec<String>,
    pub observations: Vec<PriceObservation>,
    pub stats: SearchStats,
}

#[derive(Debug)]
enum UrlOutcome {
    Price(Decimal),
    FetchError,
    OutOfStock,
    ExtractionError,
}

/// Visits every URL of every product sequentially and classifies each page.
///
/// Pages that fetch but yield no price are dropped from the cache so that
/// the next run fetches them again.
pub async fn collect_prices(
    products: &ProductsFile,
    client: &PageClient,
    bounds: PriceBounds,
) -> Collection {
    let mut collection = Collection {
        products: products.products.iter().map(|p| p.name.clone()).collect(),
        ..Collection::default()
    };
    collection.stats.total_products = products.len();

    tracing::info!(
        products = products.len(),
        urls = products.url_count(),
        "collecting prices"
    );

    for (idx, entry) in products.products.iter().enumerate() {
        tracing::info!(
            product = %entry.name,
            position = idx + 1,
            total = products.len(),
            "checking product"
        );
        let volume = parse_volume(&entry.name);

        for url in &entry.urls {
            let stats = &mut collection.stats;
            stats.total_urls_checked += 1;

            match check_url(client, url, bounds).await {
                UrlOutcome::Price(price) => {
                    let per_100ml = volume.and_then(|v| price_per_100ml(price, v.total_ml()));
                    tracing::debug!(url, %price, "found price");
                    stats.prices_found += 1;
                    collection.observations.push(PriceObservation {
                        product: entry.name.clone(),
                        url: url.clone(),
                        store: extract_domain(url),
                        price,
                        price_per_100ml: per_100ml,
                    });
                }
                UrlOutcome::FetchError => {
                    stats.fetch_errors += 1;
                    stats.failed_urls.push(url.clone());
                }
                UrlOutcome::OutOfStock => {
                    stats.out_of_stock += 1;
                    stats
                        .out_of_stock_items
                        .entry(entry.name.clone())
                        .or_default()
                        .push(url.clone());
                }
                UrlOutcome::ExtractionError => {
                    stats.extraction_errors += 1;
                    stats.failed_urls.push(url.clone());
                }
            }
        }
    }

    let stats = &collection.stats;
    tracing::info!(
        urls_checked = stats.total_urls_checked,
        prices_found = stats.prices_found,
        out_of_stock = stats.out_of_stock,
        fetch_errors = stats.fetch_errors,
        extraction_errors = stats.extraction_errors,
        "price collection finished"
    );
    collection
}

async fn check_url(client: &PageClient, url: &str, bounds: PriceBounds) -> UrlOutcome {
    let html = match client.fetch_page(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url, error = %e, "could not fetch page");
            return UrlOutcome::FetchError;
        }
    };

    if is_out_of_stock(&html) {
        tracing::debug!(url, "out of stock");
        return UrlOutcome::OutOfStock;
    }

    match extract_price(&html, bounds) {
        Some(price) => UrlOutcome::Price(price),
        None => {
            tracing::warn!(url, "could not find a price on page");
            client.forget(url);
            UrlOutcome::ExtractionError
        }
    }
}

/// Best price found for one configured product, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceResult {
    pub product: String,
    pub best: Option<PriceObservation>,
}

/// Cheapest observation per configured product, in file order. Ties keep
/// the URL listed first.
#[must_use]
pub fn cheapest_per_product(collection: &Collection) -> Vec<PriceResult> {
    collection
        .products
        .iter()
        .map(|product| PriceResult {
            product: product.clone(),
            best: collection
                .observations
                .iter()
                .filter(|o| &o.product == product)
                .min_by_key(|o| o.price)
                .cloned(),
        })
        .collect()
}

/// Keeps only the best-value size of each product family.
///
/// Within a family (products sharing a base name), the entry with the
/// lowest price per 100 ml wins. A family where no entry has a unit price
/// keeps all of its entries.
#[must_use]
pub fn best_value_sizes(results: Vec<PriceResult>) -> Vec<PriceResult> {
    let mut families: Vec<(String, Vec<PriceResult>)> = Vec::new();
    for result in results {
        let family = base_product_name(&result.product);
        match families.iter_mut().find(|(name, _)| *name == family) {
            Some((_, members)) => members.push(result),
            None => families.push((family, vec![result])),
        }
    }

    families
        .into_iter()
        .flat_map(|(_, members)| {
            let best = members
                .iter()
                .filter_map(|r| {
                    let per_100ml = r.best.as_ref()?.price_per_100ml?;
                    Some((per_100ml, r))
                })
                .min_by_key(|(per_100ml, _)| *per_100ml)
                .map(|(_, r)| r.clone());
            match best {
                Some(best) => vec![best],
                None => members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    fn observation(product: &str, url: &str, price: &str, per_100ml: Option<&str>) -> PriceObservation {
        PriceObservation {
            product: product.to_string(),
            url: url.to_string(),
            store: extract_domain(url),
            price: dec(price),
            price_per_100ml: per_100ml.map(dec),
        }
    }

    fn collection() -> Collection {
        Collection {
            products: vec![
                "Cleanser (236ml)".to_string(),
                "Cleanser (473ml)".to_string(),
                "Sunscreen".to_string(),
                "Toner (200ml)".to_string(),
            ],
            observations: vec![
                observation("Cleanser (236ml)", "https://a.pt/c236", "11.80", Some("5.00")),
                observation("Cleanser (236ml)", "https://b.pt/c236", "10.62", Some("4.50")),
                observation("Cleanser (473ml)", "https://a.pt/c473", "18.92", Some("4.00")),
                observation("Sunscreen", "https://a.pt/sun", "15.00", None),
                observation("Sunscreen", "https://b.pt/sun", "15.00", None),
            ],
            stats: SearchStats::default(),
        }
    }

    #[test]
    fn cheapest_keeps_file_order_and_missing_products() {
        let results = cheapest_per_product(&collection());
        let names: Vec<&str> = results.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(
            names,
            vec!["Cleanser (236ml)", "Cleanser (473ml)", "Sunscreen", "Toner (200ml)"]
        );
        assert_eq!(results[0].best.as_ref().unwrap().url, "https://b.pt/c236");
        assert!(results[3].best.is_none());
    }

    #[test]
    fn cheapest_tie_keeps_first_url() {
        let results = cheapest_per_product(&collection());
        assert_eq!(results[2].best.as_ref().unwrap().url, "https://a.pt/sun");
    }

    #[test]
    fn best_value_keeps_lowest_unit_price_per_family() {
        let results = best_value_sizes(cheapest_per_product(&collection()));
        let names: Vec<&str> = results.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(names, vec!["Cleanser (473ml)", "Sunscreen", "Toner (200ml)"]);
    }

    #[test]
    fn family_without_unit_prices_keeps_every_entry() {
        let results = vec![
            PriceResult {
                product: "Balm (50ml)".to_string(),
                best: None,
            },
            PriceResult {
                product: "Balm (100ml)".to_string(),
                best: None,
            },
        ];
        assert_eq!(best_value_sizes(results).len(), 2);
    }

    #[test]
    fn stats_issue_flag() {
        let mut stats = SearchStats::default();
        assert!(!stats.has_issues());
        stats.extraction_errors = 1;
        assert!(stats.has_issues());
    }
}
