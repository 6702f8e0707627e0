use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

/// Exclusive price range a scraped value must fall inside to be trusted.
///
/// Pages routinely contain other numbers that look like prices (shipping
/// fees, loyalty points, "was" prices); the bounds reject the obvious ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceBounds {
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price > self.min && price < self.max
    }
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: Decimal::ONE,
            max: Decimal::new(1000, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub price_bounds: PriceBounds,
    pub products_path: PathBuf,
    pub shipping_path: PathBuf,
    pub cache_path: PathBuf,
    pub cache_duration_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub solver_time_limit_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn solver_time_limit(&self) -> Duration {
        Duration::from_secs(self.solver_time_limit_secs)
    }
}
