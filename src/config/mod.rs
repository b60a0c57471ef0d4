/// Catalog configuration loading from catalog.toml
pub mod catalog;

/// Database connection and table creation
pub mod database;

/// Process settings from environment variables
pub mod settings;
