//! Product entity - The slice of the catalog that checkout depends on.
//!
//! Stock is a non-negative unit count. `is_available` is a cached `stock > 0` flag that every
//! stock mutation in [`crate::core::inventory`] keeps in step.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Habesha Kemis")
    pub name: String,
    /// Current catalog unit price
    #[sea_orm(column_type = "Text")]
    pub price: Money,
    /// Units on hand
    pub stock: i32,
    /// Whether the product can currently be ordered
    pub is_available: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Order lines that reference this product
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
