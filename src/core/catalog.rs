//! Catalog business logic - purchasable items and their prices.
//!
//! The `items` table is the source of truth for prices. [`CatalogCache`] keeps an in-memory
//! copy of the item names so the purchase path can reject unknown items without a database
//! round trip.

use crate::{
    config::catalog::ItemConfig,
    entities::{Item, item},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, trace};

/// Retrieves all catalog items ordered alphabetically by name.
///
/// # Errors
/// `StoreUnavailable` when the query fails.
pub async fn get_all_items<C>(db: &C) -> Result<Vec<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find()
        .order_by_asc(item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an item by its exact name.
pub async fn get_item_by_name<C>(db: &C, name: &str) -> Result<Option<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(item::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Upserts the configured items, updating the price of items that already exist.
///
/// Items present in the database but absent from `items` are left untouched.
///
/// # Errors
/// `StoreUnavailable` when the upsert fails.
pub async fn seed_catalog<C>(db: &C, items: &[ItemConfig]) -> Result<()>
where
    C: ConnectionTrait,
{
    if items.is_empty() {
        return Ok(());
    }

    let models = items.iter().map(|cfg| item::ActiveModel {
        name: Set(cfg.name.clone()),
        price: Set(cfg.price),
        ..Default::default()
    });

    Item::insert_many(models)
        .on_conflict(
            OnConflict::column(item::Column::Name)
                .update_column(item::Column::Price)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Seeded {} catalog items", items.len());
    Ok(())
}

/// Shared in-memory map of item name to price.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    items: Arc<RwLock<HashMap<String, i64>>>,
}

impl CatalogCache {
    /// Replaces the cached items with the current contents of the `items` table.
    ///
    /// # Errors
    /// `StoreUnavailable` when the items cannot be read; the previous contents are kept.
    pub async fn refresh<C>(&self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        info!("Refreshing catalog cache...");
        let items = get_all_items(db).await?;
        let mut cache_writer = self.items.write().await;
        *cache_writer = items
            .into_iter()
            .map(|item| (item.name, item.price))
            .collect();
        info!("Catalog cache refreshed with {} items.", cache_writer.len());
        trace!("Catalog cache now contains: {:?}", cache_writer);
        Ok(())
    }

    /// Whether `name` was in the catalog at the last refresh.
    pub async fn contains(&self, name: &str) -> bool {
        self.items.read().await.contains_key(name)
    }

    /// Number of cached items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
