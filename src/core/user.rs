//! Credential store - user lookup, lazy registration and balance adjustment.
//!
//! Users are never created through a separate sign-up step: the first authentication for an
//! unseen username inserts the row. [`find_or_create_user`] makes that check-and-insert race
//! safe and reports which of the two happened through [`Registration`].

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{
    QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, instrument};

/// Outcome of [`find_or_create_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// This call inserted the user row.
    Created,
    /// The row already existed, possibly inserted by a concurrent request moments earlier.
    Existing,
}

/// Identity and stored digest returned by [`find_or_create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// Primary key of the user row
    pub user_id: i64,
    /// Digest as stored in the database, to be checked with the verify primitive
    pub password_hash: String,
    /// Whether this call registered the user
    pub registration: Registration,
}

/// Finds a user by exact (case-sensitive) username.
pub async fn get_user_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by ID.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Reads a user row with `SELECT ... FOR UPDATE`, holding the row lock until `db` commits.
///
/// Must be called on a transaction. On `SQLite` the lock clause is not rendered; there the
/// single-connection pool opened by `config::database::connect` serializes transactions.
pub async fn lock_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { user_id })
}

/// Returns the user registered under `username`, creating it if absent.
///
/// When the user exists, its stored digest is returned and `password_hash` is ignored. When it
/// does not, a row is inserted with `password_hash` and `starting_balance` through
/// [`insert_or_get_user`], so a concurrent registration of the same name turns this call into
/// a plain lookup instead of a failure.
///
/// # Errors
/// `StoreUnavailable` when the store cannot be reached or the transaction fails.
#[instrument(skip(db, password_hash))]
pub async fn find_or_create_user(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    starting_balance: i64,
) -> Result<UserCredentials> {
    let txn = db.begin().await?;

    if let Some(existing) = get_user_by_username(&txn, username).await? {
        txn.commit().await?;
        debug!(user_id = existing.id, "Found existing user");
        return Ok(UserCredentials {
            user_id: existing.id,
            password_hash: existing.password_hash,
            registration: Registration::Existing,
        });
    }

    let credentials = insert_or_get_user(&txn, username, password_hash, starting_balance).await?;
    txn.commit().await?;
    Ok(credentials)
}

/// Inserts `username` with `ON CONFLICT (username) DO NOTHING` and re-reads the row.
///
/// If another request registered the name first, nothing is inserted and the winner's row
/// comes back as [`Registration::Existing`].
///
/// # Errors
/// `StoreUnavailable` when the insert or the re-read fails.
pub(crate) async fn insert_or_get_user<C>(
    db: &C,
    username: &str,
    password_hash: &str,
    starting_balance: i64,
) -> Result<UserCredentials>
where
    C: ConnectionTrait,
{
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash.to_string()),
        balance: Set(starting_balance),
        ..Default::default()
    };
    let inserted = User::insert(new_user)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let stored = get_user_by_username(db, username)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("user '{username}' missing after insert"))
        })?;

    let registration = if inserted == 1 {
        info!(user_id = stored.id, "Registered new user");
        Registration::Created
    } else {
        debug!(user_id = stored.id, "Lost registration race, using existing user");
        Registration::Existing
    };

    Ok(UserCredentials {
        user_id: stored.id,
        password_hash: stored.password_hash,
        registration,
    })
}

/// Atomically applies `balance = balance + delta` to one user.
///
/// Negative deltas only apply while the balance covers them, so this can never commit a
/// negative balance even without a prior lock. Works on a plain connection or inside a
/// transaction.
///
/// # Errors
/// `UserNotFound` when the user does not exist, `InsufficientBalance` when a debit exceeds
/// the balance.
pub async fn adjust_balance<C>(db: &C, user_id: i64, delta: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut update = User::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).add(delta),
        )
        .filter(user::Column::Id.eq(user_id));
    if delta < 0 {
        update = update.filter(user::Column::Balance.gte(delta.saturating_neg()));
    }

    if update.exec(db).await?.rows_affected == 1 {
        return Ok(());
    }

    match get_user_by_id(db, user_id).await? {
        None => Err(Error::UserNotFound { user_id }),
        Some(user) => Err(Error::InsufficientBalance {
            current: user.balance,
            required: delta.saturating_neg(),
        }),
    }
}
