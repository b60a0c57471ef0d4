//! Core business logic - framework-agnostic credential store and ledger operations.
//!
//! Every function takes an explicit database handle; nothing here knows about HTTP.

/// Catalog items and the in-memory catalog cache
pub mod catalog;
/// Item purchases
pub mod purchase;
/// Consistent per-user reads for `/api/info`
pub mod snapshot;
/// Coin transfers between users
pub mod transfer;
/// User lookup, lazy registration and balance adjustment
pub mod user;
