//! Shared test utilities for the coin shop.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users and catalogs with sensible defaults.

use crate::{
    config::{catalog::CatalogConfig, settings::DatabaseSettings},
    core::{
        catalog::{CatalogCache, seed_catalog},
        user::{find_or_create_user, get_user_by_id},
    },
    entities,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Cheapest bcrypt cost the crate accepts, to keep hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Balance every test user starts with.
pub const TEST_STARTING_BALANCE: i64 = 1000;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database through [`crate::config::database::connect`]
/// with a multi-connection pool requested, for tests that run operations concurrently.
///
/// The returned directory must be kept alive for as long as the database is used.
pub async fn setup_pooled_test_db() -> Result<(tempfile::TempDir, DatabaseConnection)> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display());
    let db = crate::config::database::connect(&DatabaseSettings {
        url,
        max_connections: 8,
        min_connections: 1,
    })
    .await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// Registers a test user with sensible defaults.
///
/// # Defaults
/// * `password_hash`: a placeholder, not a valid bcrypt digest
/// * `balance`: [`TEST_STARTING_BALANCE`]
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    let credentials =
        find_or_create_user(db, username, "test-digest", TEST_STARTING_BALANCE).await?;
    get_user_by_id(db, credentials.user_id)
        .await?
        .ok_or(Error::UserNotFound {
            user_id: credentials.user_id,
        })
}

/// Sets up a database with two users, `alice` and `bob`.
/// Returns `(db, alice, bob)`.
pub async fn setup_with_two_users() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let alice = create_test_user(&db, "alice").await?;
    let bob = create_test_user(&db, "bob").await?;
    Ok((db, alice, bob))
}

/// Sets up a database with the built-in catalog seeded and one user, `alice`.
/// Returns `(db, catalog_cache, alice)`.
pub async fn setup_with_catalog_and_user()
-> Result<(DatabaseConnection, CatalogCache, entities::user::Model)> {
    let db = setup_test_db().await?;
    seed_catalog(&db, &CatalogConfig::builtin().items).await?;

    let catalog = CatalogCache::default();
    catalog.refresh(&db).await?;

    let user = create_test_user(&db, "alice").await?;
    Ok((db, catalog, user))
}
