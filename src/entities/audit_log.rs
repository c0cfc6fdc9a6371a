//! Audit log entity - Append-only record of order status transitions.
//!
//! One row per transition. `admin_id` is a plain nullable reference so removing an admin
//! account never removes history.

use super::order::OrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order the transition applied to (row id)
    #[serde(skip_serializing)]
    pub order_id: i64,
    /// Admin who performed the transition
    pub admin_id: Option<i64>,
    /// Human label, e.g. `"Order Verified"`
    pub action: String,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    pub note: Option<String>,
    pub timestamp: DateTimeUtc,
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
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
