pub mod app_config;
pub mod config;
pub mod domain;
pub mod offer;
pub mod products;
pub mod shipping;
pub mod volume;

pub use app_config::{AppConfig, PriceBounds};
pub use config::{load_app_config, load_app_config_from_env};
pub use domain::extract_domain;
pub use offer::Offer;
pub use products::{filter_by_products, filter_by_sites, load_products, ProductEntry, ProductsFile};
pub use shipping::{load_shipping, ShippingConfig, ShippingRule};
pub use volume::{base_product_name, parse_volume, price_per_100ml, Volume};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration validation error: {0}")]
    Validation(String),
}
