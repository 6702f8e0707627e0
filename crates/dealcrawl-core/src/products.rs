use std::collections::HashSet;
use std::path::Path;

use serde_yaml::Value;

use crate::domain::extract_domain;
use crate::ConfigError;

/// A product to price, as configured: its display name (optionally with a
/// size suffix such as `"(236ml)"`) and the store pages that sell it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    pub name: String,
    pub urls: Vec<String>,
}

/// Products file contents, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsFile {
    pub products: Vec<ProductEntry>,
}

impl ProductsFile {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Total number of URLs across all products.
    #[must_use]
    pub fn url_count(&self) -> usize {
        self.products.iter().map(|p| p.urls.len()).sum()
    }
}

/// Load and validate the products file.
///
/// The file is a YAML mapping from product name to a list of product page
/// URLs.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_products(path: &Path) -> Result<ProductsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_products(&content, &path.display().to_string())
}

fn parse_products(content: &str, origin: &str) -> Result<ProductsFile, ConfigError> {
    let root: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::FileParse {
        path: origin.to_string(),
        source: e,
    })?;

    let mapping = match root {
        Value::Null => {
            return Err(ConfigError::Validation(format!("{origin} is empty")));
        }
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ConfigError::Validation(format!(
                "{origin} must contain a mapping of product names to URL lists"
            )));
        }
    };

    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(mapping.len());

    for (key, value) in mapping {
        let Value::String(name) = key else {
            return Err(ConfigError::Validation(format!(
                "{origin} has a non-string product name: {key:?}"
            )));
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product name: '{name}'"
            )));
        }

        let urls = match value {
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(url) => Ok(url.trim().to_string()),
                    other => Err(ConfigError::Validation(format!(
                        "product '{name}' contains a non-string URL: {other:?}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::Null => Vec::new(),
            _ => {
                return Err(ConfigError::Validation(format!(
                    "product '{name}' must map to a list of URLs"
                )));
            }
        };

        if urls.is_empty() {
            tracing::warn!(product = %name, "product has no URLs configured");
        }
        products.push(ProductEntry { name, urls });
    }

    Ok(ProductsFile { products })
}

/// Keeps only URLs whose host contains one of `sites` (case-insensitive).
/// Products left without URLs are dropped.
#[must_use]
pub fn filter_by_sites(products: &ProductsFile, sites: &[String]) -> ProductsFile {
    let sites: Vec<String> = sites
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let products = products
        .products
        .iter()
        .filter_map(|entry| {
            let urls: Vec<String> = entry
                .urls
                .iter()
                .filter(|url| {
                    let domain = extract_domain(url).to_lowercase();
                    sites.iter().any(|site| domain.contains(site.as_str()))
                })
                .cloned()
                .collect();
            (!urls.is_empty()).then(|| ProductEntry {
                name: entry.name.clone(),
                urls,
            })
        })
        .collect();

    ProductsFile { products }
}

/// Keeps only products whose name contains one of `substrings`
/// (case-insensitive).
#[must_use]
pub fn filter_by_products(products: &ProductsFile, substrings: &[String]) -> ProductsFile {
    let needles: Vec<String> = substrings
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let products = products
        .products
        .iter()
        .filter(|entry| {
            let name = entry.name.to_lowercase();
            needles.iter().any(|needle| name.contains(needle.as_str()))
        })
        .cloned()
        .collect();

    ProductsFile { products }
}
