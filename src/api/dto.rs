//! JSON request and response bodies for the HTTP API.

use crate::core::snapshot::{CoinMovement, InventoryItem, UserSnapshot};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth`. Missing fields read as empty and are rejected as bad credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    /// Login name; unseen names are registered
    #[serde(default)]
    pub username: String,
    /// Plaintext password, only ever hashed or verified
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Body of a successful `POST /api/auth`.
pub struct AuthResponse {
    /// Bearer token for the protected routes
    pub token: String,
}

/// Body of `POST /api/sendCoin`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username
    pub to_user: String,
    /// Coins to send, must be positive
    pub amount: i64,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short generic description of the failure
    pub errors: String,
}

/// Body of `GET /api/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance
    pub coins: i64,
    /// Owned items
    pub inventory: Vec<ItemDto>,
    /// Coins received and sent
    pub coin_history: CoinHistoryDto,
}

/// One inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDto {
    /// Catalog item name
    #[serde(rename = "type")]
    pub item_type: String,
    /// Units owned
    pub quantity: i64,
}

/// Both sides of a user's coin history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistoryDto {
    /// Transfers to this user
    pub received: Vec<CoinTransactionDto>,
    /// Transfers from this user
    pub sent: Vec<CoinTransactionDto>,
}

/// One history entry; `user` is the sender for received coins and the recipient for sent ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTransactionDto {
    /// Counterparty username
    pub user: String,
    /// Coins moved
    pub amount: i64,
}

impl From<InventoryItem> for ItemDto {
    fn from(item: InventoryItem) -> Self {
        Self {
            item_type: item.item_type,
            quantity: item.quantity,
        }
    }
}

impl From<CoinMovement> for CoinTransactionDto {
    fn from(movement: CoinMovement) -> Self {
        Self {
            user: movement.counterparty,
            amount: movement.amount,
        }
    }
}

impl From<UserSnapshot> for InfoResponse {
    fn from(snapshot: UserSnapshot) -> Self {
        Self {
            coins: snapshot.coins,
            inventory: snapshot.inventory.into_iter().map(Into::into).collect(),
            coin_history: CoinHistoryDto {
                received: snapshot.received.into_iter().map(Into::into).collect(),
                sent: snapshot.sent.into_iter().map(Into::into).collect(),
            },
        }
    }
}
