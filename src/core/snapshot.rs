//! Point-in-time view of a user's balance, inventory and coin history.

use crate::{
    core::user::get_user_by_id,
    entities::{CoinTransaction, Inventory, User, coin_transaction, inventory, user},
    errors::{Error, Result},
};
use sea_orm::{AccessMode, DatabaseBackend, IsolationLevel, QueryOrder, TransactionTrait, prelude::*};
use std::collections::{BTreeSet, HashMap};
use tracing::instrument;

/// Number of units of one item a user owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    /// Catalog item name
    pub item_type: String,
    /// Units owned, always positive
    pub quantity: i64,
}

/// One coin transaction seen from one side, labelled with the other party's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinMovement {
    /// Username on the other side of the transfer
    pub counterparty: String,
    /// Coins moved, always positive
    pub amount: i64,
}

/// Everything `/api/info` reports, read at a single moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    /// Current balance
    pub coins: i64,
    /// Owned items, ordered by name
    pub inventory: Vec<InventoryItem>,
    /// Oldest first, labelled with the sender
    pub received: Vec<CoinMovement>,
    /// Oldest first, labelled with the recipient
    pub sent: Vec<CoinMovement>,
}

/// Reads balance, inventory and both history views in one read-only transaction.
///
/// On PostgreSQL the transaction runs at REPEATABLE READ so every query sees the same
/// snapshot; a balance can never be paired with a history that lacks the matching row.
/// `SQLite` transactions are already serializable.
///
/// # Errors
/// `UserNotFound` when the user does not exist, `StoreUnavailable` on database failure.
#[instrument(skip(db))]
pub async fn read_user_snapshot(db: &DatabaseConnection, user_id: i64) -> Result<UserSnapshot> {
    let txn = match db.get_database_backend() {
        DatabaseBackend::Sqlite => db.begin().await?,
        _ => {
            db.begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await?
        }
    };

    let user = get_user_by_id(&txn, user_id)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;

    let inventory = Inventory::find()
        .filter(inventory::Column::UserId.eq(user_id))
        .filter(inventory::Column::Quantity.gt(0))
        .order_by_asc(inventory::Column::ItemType)
        .all(&txn)
        .await?;

    let received = CoinTransaction::find()
        .filter(coin_transaction::Column::ToUserId.eq(user_id))
        .order_by_asc(coin_transaction::Column::Id)
        .all(&txn)
        .await?;

    let sent = CoinTransaction::find()
        .filter(coin_transaction::Column::FromUserId.eq(user_id))
        .order_by_asc(coin_transaction::Column::Id)
        .all(&txn)
        .await?;

    let counterparty_ids: BTreeSet<i64> = received
        .iter()
        .map(|tx| tx.from_user_id)
        .chain(sent.iter().map(|tx| tx.to_user_id))
        .collect();
    let usernames: HashMap<i64, String> = if counterparty_ids.is_empty() {
        HashMap::new()
    } else {
        User::find()
            .filter(user::Column::Id.is_in(counterparty_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };

    txn.commit().await?;

    let label = |counterparty_id: i64, amount: i64| -> Result<CoinMovement> {
        let counterparty = usernames
            .get(&counterparty_id)
            .cloned()
            .ok_or(Error::UserNotFound {
                user_id: counterparty_id,
            })?;
        Ok(CoinMovement {
            counterparty,
            amount,
        })
    };

    Ok(UserSnapshot {
        coins: user.balance,
        inventory: inventory
            .into_iter()
            .map(|entry| InventoryItem {
                item_type: entry.item_type,
                quantity: entry.quantity,
            })
            .collect(),
        received: received
            .iter()
            .map(|tx| label(tx.from_user_id, tx.amount))
            .collect::<Result<_>>()?,
        sent: sent
            .iter()
            .map(|tx| label(tx.to_user_id, tx.amount))
            .collect::<Result<_>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{purchase::buy_item, transfer::transfer_coins};
    use crate::test_utils::*;

    fn movement(counterparty: &str, amount: i64) -> CoinMovement {
        CoinMovement {
            counterparty: counterparty.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_new_user_has_empty_collections() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice").await?;

        let snapshot = read_user_snapshot(&db, user.id).await?;
        assert_eq!(
            snapshot,
            UserSnapshot {
                coins: 1000,
                inventory: vec![],
                received: vec![],
                sent: vec![],
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_user() -> Result<()> {
        let db = setup_test_db().await?;
        let result = read_user_snapshot(&db, 42).await;
        assert!(matches!(result, Err(Error::UserNotFound { user_id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_scenario_histories() -> Result<()> {
        let (db, alice, bob) = setup_with_two_users().await?;
        let carol = create_test_user(&db, "carol").await?;

        transfer_coins(&db, alice.id, "bob", 200).await?;

        let a = read_user_snapshot(&db, alice.id).await?;
        assert_eq!(a.coins, 800);
        assert_eq!(a.sent, vec![movement("bob", 200)]);
        assert!(a.received.is_empty());

        let b = read_user_snapshot(&db, bob.id).await?;
        assert_eq!(b.coins, 1200);
        assert_eq!(b.received, vec![movement("alice", 200)]);
        assert!(b.sent.is_empty());

        transfer_coins(&db, bob.id, "carol", 300).await?;

        let b = read_user_snapshot(&db, bob.id).await?;
        assert_eq!(b.coins, 900);
        assert_eq!(b.received, vec![movement("alice", 200)]);
        assert_eq!(b.sent, vec![movement("carol", 300)]);

        let c = read_user_snapshot(&db, carol.id).await?;
        assert_eq!(c.coins, 1300);
        assert_eq!(c.received, vec![movement("bob", 300)]);

        // Alice's view is unchanged by the second transfer
        assert_eq!(read_user_snapshot(&db, alice.id).await?, a);

        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_transfers_are_listed_individually() -> Result<()> {
        let (db, alice, bob) = setup_with_two_users().await?;

        transfer_coins(&db, alice.id, "bob", 10).await?;
        transfer_coins(&db, alice.id, "bob", 20).await?;

        let a = read_user_snapshot(&db, alice.id).await?;
        assert_eq!(a.sent, vec![movement("bob", 10), movement("bob", 20)]);
        let b = read_user_snapshot(&db, bob.id).await?;
        assert_eq!(b.received, vec![movement("alice", 10), movement("alice", 20)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_inventory_in_snapshot() -> Result<()> {
        let (db, catalog, user) = setup_with_catalog_and_user().await?;

        buy_item(&db, &catalog, user.id, "t-shirt", 1).await?;
        buy_item(&db, &catalog, user.id, "t-shirt", 1).await?;
        buy_item(&db, &catalog, user.id, "cup", 1).await?;

        let snapshot = read_user_snapshot(&db, user.id).await?;
        assert_eq!(snapshot.coins, 1000 - 80 - 80 - 20);
        assert_eq!(
            snapshot.inventory,
            vec![
                InventoryItem {
                    item_type: "cup".to_string(),
                    quantity: 1
                },
                InventoryItem {
                    item_type: "t-shirt".to_string(),
                    quantity: 2
                },
            ]
        );
        assert!(snapshot.sent.is_empty());

        Ok(())
    }
}
