//! Coin transfer logic - moves coins between users and records the movement.
//!
//! [`transfer_coins`] is the use-case entry point: it validates input, resolves the recipient
//! by username and then hands off to [`transfer_atomic`], which performs the balance changes
//! and the audit record in a single database transaction.

use crate::{
    core::user::{adjust_balance, get_user_by_username, lock_user},
    entities::coin_transaction,
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Moves `amount` coins from one user to another inside one transaction.
///
/// Both user rows are locked in ascending ID order before the sender's balance is checked,
/// so two transfers touching the same account serialize and two transfers crossing in
/// opposite directions cannot deadlock. The debit, the credit and the coin transaction
/// record commit together or not at all.
///
/// # Errors
/// `InvalidAmount` for non-positive amounts, `SelfTransfer` when both IDs match,
/// `UserNotFound` when either user is missing, `InsufficientBalance` when the sender cannot
/// cover `amount`.
#[instrument(skip(db))]
pub async fn transfer_atomic(
    db: &DatabaseConnection,
    from_user_id: i64,
    to_user_id: i64,
    amount: i64,
) -> Result<coin_transaction::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if from_user_id == to_user_id {
        return Err(Error::SelfTransfer);
    }

    let txn = db.begin().await?;

    let (first, second) = if from_user_id < to_user_id {
        (from_user_id, to_user_id)
    } else {
        (to_user_id, from_user_id)
    };
    let first_row = lock_user(&txn, first).await?;
    let second_row = lock_user(&txn, second).await?;
    let sender = if first_row.id == from_user_id {
        first_row
    } else {
        second_row
    };

    if sender.balance < amount {
        return Err(Error::InsufficientBalance {
            current: sender.balance,
            required: amount,
        });
    }

    adjust_balance(&txn, from_user_id, -amount).await?;
    adjust_balance(&txn, to_user_id, amount).await?;

    let record = coin_transaction::ActiveModel {
        from_user_id: Set(from_user_id),
        to_user_id: Set(to_user_id),
        amount: Set(amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(transaction_id = record.id, "Transferred coins");

    Ok(record)
}

/// Sends `amount` coins from `from_user_id` to the user named `to_username`.
///
/// Non-positive amounts and empty recipient names are rejected before the database is
/// touched. The recipient must exist and differ from the sender.
///
/// # Errors
/// `InvalidAmount`, `UnknownRecipient`, `SelfTransfer`, `InsufficientBalance`, or
/// `StoreUnavailable` on database failure.
pub async fn transfer_coins(
    db: &DatabaseConnection,
    from_user_id: i64,
    to_username: &str,
    amount: i64,
) -> Result<coin_transaction::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if to_username.is_empty() {
        return Err(Error::UnknownRecipient {
            username: String::new(),
        });
    }

    let recipient = get_user_by_username(db, to_username)
        .await?
        .ok_or_else(|| Error::UnknownRecipient {
            username: to_username.to_string(),
        })?;

    if recipient.id == from_user_id {
        return Err(Error::SelfTransfer);
    }

    transfer_atomic(db, from_user_id, recipient.id, amount).await
}
