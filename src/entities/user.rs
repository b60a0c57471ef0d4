//! User entity - Represents an account holding a coin balance.
//!
//! Users are created lazily on their first successful authentication and are never deleted.
//! The `balance` column must never drop below zero in any committed state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Surrogate key assigned at creation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique, case-sensitive login name (1 to 31 characters)
    #[sea_orm(unique)]
    pub username: String,
    /// Password digest, only ever compared through the verify primitive
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current coin count
    pub balance: i64,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many inventory entries
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
