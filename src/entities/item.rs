//! Item entity - A purchasable catalog entry with a fixed price.
//!
//! Items are seeded from the catalog configuration at startup and referenced by name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name used in `/api/buy/{item}` (e.g., "t-shirt")
    #[sea_orm(unique)]
    pub name: String,
    /// Price per unit in coins
    pub price: i64,
}

/// `Item` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
