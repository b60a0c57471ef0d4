//! Database configuration module for the coin shop.
//!
//! This module opens the connection pool and creates the tables the service needs. Tables
//! are generated from the entity definitions with `SeaORM`'s `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. PostgreSQL is the production store;
//! `SQLite` is used for tests and local runs.

use crate::config::settings::DatabaseSettings;
use crate::entities::{CoinTransaction, Inventory, InventoryColumn, Item, User};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::time::Duration;
use tracing::{debug, info};

/// Opens a connection pool using the configured URL and pool bounds.
///
/// `SQLite` has no row locks, and two deferred transactions that both write fail with
/// `database is locked`. Its pool is therefore held to a single connection, which queues
/// transactions instead of failing them.
///
/// # Errors
/// `StoreUnavailable` when the database cannot be reached.
pub async fn connect(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let (max_connections, min_connections) = pool_bounds(settings);

    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

fn pool_bounds(settings: &DatabaseSettings) -> (u32, u32) {
    if settings.url.starts_with("sqlite:") {
        if settings.max_connections > 1 {
            debug!(
                requested = settings.max_connections,
                "Limiting SQLite pool to one connection"
            );
        }
        (1, 1)
    } else {
        (settings.max_connections, settings.min_connections)
    }
}

/// Creates all tables (if missing) plus the unique inventory index.
///
/// Creation order follows the foreign keys: users first, then the tables referencing them.
///
/// # Errors
/// `StoreUnavailable` when a statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Item).await?;
    create_table(db, &schema, Inventory).await?;
    create_table(db, &schema, CoinTransaction).await?;

    let inventory_index = Index::create()
        .name("idx_inventory_user_item")
        .table(Inventory)
        .col(InventoryColumn::UserId)
        .col(InventoryColumn::ItemType)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&inventory_index)).await?;

    debug!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
