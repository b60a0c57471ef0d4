//! Catalog configuration loading from catalog.toml
//!
//! This module loads the list of purchasable items and their prices from a TOML file.
//! The items defined there are upserted into the database at startup. When the file does
//! not exist the built-in merch list is used instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{collections::HashSet, path::Path};
use tracing::info;

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Items available in the shop
    pub items: Vec<ItemConfig>,
}

/// Configuration for a single catalog item
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ItemConfig {
    /// Name of the item, as used in `/api/buy/{item}`
    pub name: String,
    /// Price per unit in coins
    pub price: i64,
}

impl ItemConfig {
    fn new(name: &str, price: i64) -> Self {
        Self {
            name: name.to_string(),
            price,
        }
    }
}

impl CatalogConfig {
    /// The merch list the shop ships with.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            items: vec![
                ItemConfig::new("t-shirt", 80),
                ItemConfig::new("cup", 20),
                ItemConfig::new("book", 50),
                ItemConfig::new("pen", 10),
                ItemConfig::new("powerbank", 200),
                ItemConfig::new("hoody", 300),
                ItemConfig::new("umbrella", 200),
                ItemConfig::new("socks", 10),
                ItemConfig::new("wallet", 50),
                ItemConfig::new("pink-hoody", 500),
            ],
        }
    }

    /// Checks names are non-empty and unique and prices are positive.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first offending item.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(Error::Config {
                    message: "Catalog item name cannot be empty".to_string(),
                });
            }
            if item.price <= 0 {
                return Err(Error::Config {
                    message: format!("Catalog item '{}' has non-positive price {}", item.name, item.price),
                });
            }
            if !seen.insert(item.name.as_str()) {
                return Err(Error::Config {
                    message: format!("Catalog item '{}' is listed twice", item.name),
                });
            }
        }
        Ok(())
    }
}

/// Loads and validates the catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - An item has an empty name, a duplicate name or a non-positive price
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    let catalog: CatalogConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })?;
    catalog.validate()?;
    Ok(catalog)
}

/// Loads the catalog from `path`, falling back to [`CatalogConfig::builtin`] when the file
/// does not exist.
///
/// # Errors
/// Any error of [`load_catalog`] when the file exists.
pub fn load_catalog_or_builtin<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path = path.as_ref();
    if path.exists() {
        info!("Loading catalog from {}", path.display());
        load_catalog(path)
    } else {
        info!(
            "Catalog file {} not found, using built-in items",
            path.display()
        );
        Ok(CatalogConfig::builtin())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[items]]
            name = "t-shirt"
            price = 80

            [[items]]
            name = "cup"
            price = 20
        "#;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0], ItemConfig::new("t-shirt", 80));
        assert_eq!(config.items[1].name, "cup");
        assert_eq!(config.items[1].price, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = CatalogConfig::builtin();
        assert_eq!(catalog.items.len(), 10);
        assert!(catalog.validate().is_ok());
        assert!(catalog.items.contains(&ItemConfig::new("t-shirt", 80)));
    }

    #[test]
    fn test_validate_rejects_bad_items() {
        let zero_price = CatalogConfig {
            items: vec![ItemConfig::new("pen", 0)],
        };
        assert!(matches!(zero_price.validate(), Err(Error::Config { .. })));

        let blank = CatalogConfig {
            items: vec![ItemConfig::new("  ", 10)],
        };
        assert!(matches!(blank.validate(), Err(Error::Config { .. })));

        let duplicate = CatalogConfig {
            items: vec![ItemConfig::new("pen", 10), ItemConfig::new("pen", 12)],
        };
        assert!(matches!(duplicate.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[items]]\nname = \"sticker\"\nprice = 5").unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.items, vec![ItemConfig::new("sticker", 5)]);
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog_or_builtin(dir.path().join("absent.toml")).unwrap();
        assert_eq!(catalog.items, CatalogConfig::builtin().items);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "items = 3").unwrap();
        assert!(matches!(load_catalog(file.path()), Err(Error::Config { .. })));
    }
}
