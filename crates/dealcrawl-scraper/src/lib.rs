//! Fetching, caching and reading store product pages.

pub mod cache;
pub mod client;
pub mod collect;
pub mod error;
pub mod extract;
mod jsonld;
pub mod offers;
mod rate_limit;
pub mod stock;

pub use cache::HttpCache;
pub use client::{ClientOptions, PageClient};
pub use collect::{
    best_value_sizes, cheapest_per_product, collect_prices, Collection, PriceObservation,
    PriceResult, SearchStats,
};
pub use error::ScraperError;
pub use extract::{extract_price, parse_price_string};
pub use offers::{build_offers, requested_products};
pub use stock::is_out_of_stock;
