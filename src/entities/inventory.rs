//! Inventory entity - Per-user count of a purchased item.
//!
//! One row per `(user_id, item_type)` pair, created on first purchase and incremented after.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the items
    pub user_id: i64,
    /// Item name as listed in the catalog
    pub item_type: String,
    /// Number of units owned
    pub quantity: i64,
}

/// Defines relationships between Inventory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
