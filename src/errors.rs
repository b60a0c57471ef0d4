//! Unified error type for the coin shop.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps each
//! variant onto a status code and a generic client-facing message (see `api::error`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing login, or a bad, expired or forged bearer token.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The debit exceeds the current balance.
    #[error("Insufficient balance: have {current}, need {required}")]
    InsufficientBalance { current: i64, required: i64 },

    /// No user has the requested recipient name.
    #[error("Unknown recipient: {username}")]
    UnknownRecipient { username: String },

    /// The item is not in the catalog.
    #[error("Unknown item: {name}")]
    UnknownItem { name: String },

    /// Transfer amount is zero or negative.
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    /// Purchase quantity is non-positive or its total overflows.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Sender and recipient are the same user.
    #[error("Cannot transfer coins to yourself")]
    SelfTransfer,

    /// No user row with this ID.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    /// Connectivity or transaction failure in the relational store.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sea_orm::DbErr),

    /// Invalid settings or catalog file.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Token could not be signed.
    #[error("Token error: {message}")]
    Token { message: String },

    /// bcrypt rejected the input or cost.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Socket or file failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
