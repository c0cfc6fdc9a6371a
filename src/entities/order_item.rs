//! Order item entity - One purchased line, snapshotted at checkout.
//!
//! `price` and `product_name` are copies taken when the order was placed, so later catalog
//! edits never rewrite history. Deleting a product only clears `product_id`.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order (row id)
    #[serde(skip_serializing)]
    pub order_id: i64,
    /// Catalog product, cleared if the product is deleted
    pub product_id: Option<i64>,
    /// Product name at purchase time
    pub product_name: String,
    /// Units purchased, at least 1
    pub quantity: i32,
    /// Unit price at purchase time
    #[sea_orm(column_type = "Text")]
    pub price: Money,
}

impl Model {
    /// `price * quantity`, or `None` on overflow
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.price
            .amount()
            .checked_mul(Decimal::from(self.quantity))
            .map(Money::from_decimal)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
