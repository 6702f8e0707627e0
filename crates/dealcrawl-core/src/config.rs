use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, PriceBounds};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the combination is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the combination is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional and uses the `DEAL_CRAWLER_` prefix. The lookup
/// is injected so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let log_level = or_default("DEAL_CRAWLER_LOG_LEVEL", "warn");

    let price_bounds = PriceBounds {
        min: parse_decimal("DEAL_CRAWLER_MIN_PRICE", "1.0")?,
        max: parse_decimal("DEAL_CRAWLER_MAX_PRICE", "1000.0")?,
    };
    if price_bounds.min >= price_bounds.max {
        return Err(ConfigError::Validation(format!(
            "DEAL_CRAWLER_MIN_PRICE ({}) must be below DEAL_CRAWLER_MAX_PRICE ({})",
            price_bounds.min, price_bounds.max
        )));
    }

    let products_path = PathBuf::from(or_default("DEAL_CRAWLER_PRODUCTS_FILE", "products.yml"));
    let shipping_path = PathBuf::from(or_default("DEAL_CRAWLER_SHIPPING_FILE", "shipping.yaml"));
    let cache_path = PathBuf::from(or_default("DEAL_CRAWLER_CACHE_FILE", ".http_cache.json"));
    let cache_duration_secs = parse_u64("DEAL_CRAWLER_CACHE_DURATION", "3600")?;

    let request_timeout_secs = parse_u64("DEAL_CRAWLER_REQUEST_TIMEOUT", "15")?;
    let user_agent = or_default("DEAL_CRAWLER_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("DEAL_CRAWLER_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("DEAL_CRAWLER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let delay_min_ms = parse_u64("DEAL_CRAWLER_DELAY_MIN_MS", "1000")?;
    let delay_max_ms = parse_u64("DEAL_CRAWLER_DELAY_MAX_MS", "2000")?;
    if delay_min_ms > delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "DEAL_CRAWLER_DELAY_MIN_MS ({delay_min_ms}) must not exceed DEAL_CRAWLER_DELAY_MAX_MS ({delay_max_ms})"
        )));
    }

    let solver_time_limit_secs = parse_u64("DEAL_CRAWLER_SOLVER_TIME_LIMIT_SECS", "30")?;
    if solver_time_limit_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEAL_CRAWLER_SOLVER_TIME_LIMIT_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        price_bounds,
        products_path,
        shipping_path,
        cache_path,
        cache_duration_secs,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        delay_min_ms,
        delay_max_ms,
        solver_time_limit_secs,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
