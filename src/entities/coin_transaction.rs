//! Coin transaction entity - Immutable audit record of one coin transfer.
//!
//! Rows are appended once per successful transfer and never updated or deleted.
//! Purchases do not produce coin transactions; they only show up in the inventory.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coin transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coin_transactions")]
pub struct Model {
    /// Unique identifier, also the tie-breaker for ordering
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sender's user ID
    pub from_user_id: i64,
    /// Recipient's user ID
    pub to_user_id: i64,
    /// Coins moved, always positive
    pub amount: i64,
    /// When the transfer committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `CoinTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The user the coins left
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FromUserId",
        to = "super::user::Column::Id"
    )]
    Sender,
    /// The user the coins arrived at
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ToUserId",
        to = "super::user::Column::Id"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}
