//! Purchase logic - spends coins on catalog items.
//!
//! Coins spent on purchases leave the system: the buyer's balance drops and the inventory
//! grows, but no coin transaction is recorded.

use crate::{
    core::{
        catalog::{CatalogCache, get_item_by_name},
        user::{adjust_balance, lock_user},
    },
    entities::{Inventory, inventory},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Buys `quantity` units of `item_name` for `user_id` inside one transaction.
///
/// The price is read inside the transaction, the buyer's row is locked, the balance is
/// checked and debited, and the inventory entry is inserted or incremented. Everything
/// commits together or not at all.
///
/// # Errors
/// `InvalidQuantity` for non-positive quantities or a total that overflows, `UnknownItem`,
/// `UserNotFound`, `InsufficientBalance`, or `StoreUnavailable`.
#[instrument(skip(db))]
pub async fn purchase(
    db: &DatabaseConnection,
    user_id: i64,
    item_name: &str,
    quantity: i64,
) -> Result<inventory::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let txn = db.begin().await?;

    let item = get_item_by_name(&txn, item_name)
        .await?
        .ok_or_else(|| Error::UnknownItem {
            name: item_name.to_string(),
        })?;
    let total = item
        .price
        .checked_mul(quantity)
        .ok_or(Error::InvalidQuantity { quantity })?;

    let buyer = lock_user(&txn, user_id).await?;
    if buyer.balance < total {
        return Err(Error::InsufficientBalance {
            current: buyer.balance,
            required: total,
        });
    }

    adjust_balance(&txn, user_id, -total).await?;

    let existing = Inventory::find()
        .filter(inventory::Column::UserId.eq(user_id))
        .filter(inventory::Column::ItemType.eq(item_name))
        .one(&txn)
        .await?;

    let entry = match existing {
        Some(entry) => {
            let new_quantity = entry
                .quantity
                .checked_add(quantity)
                .ok_or(Error::InvalidQuantity { quantity })?;
            let mut entry: inventory::ActiveModel = entry.into();
            entry.quantity = Set(new_quantity);
            entry.update(&txn).await?
        }
        None => {
            inventory::ActiveModel {
                user_id: Set(user_id),
                item_type: Set(item_name.to_string()),
                quantity: Set(quantity),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;
    info!(total, "Purchased item");

    Ok(entry)
}

/// Buys `quantity` units of `item_name` for `user_id`.
///
/// Non-positive quantities and names missing from the catalog cache are rejected before the
/// database is touched.
///
/// # Errors
/// `InvalidQuantity`, `UnknownItem`, or any error of [`purchase`].
pub async fn buy_item(
    db: &DatabaseConnection,
    catalog: &CatalogCache,
    user_id: i64,
    item_name: &str,
    quantity: i64,
) -> Result<inventory::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    if !catalog.contains(item_name).await {
        return Err(Error::UnknownItem {
            name: item_name.to_string(),
        });
    }

    purchase(db, user_id, item_name, quantity).await
}
