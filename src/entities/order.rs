//! Order entity - A customer's checkout, its payment details and its review status.
//!
//! Orders are created once by checkout and afterwards only change `status`, `admin_note`
//! and `updated_at`, through the status machine in [`crate::core::status`].

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfilment option chosen at checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "pickup")]
    Pickup,
}

/// Channel the customer paid through
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "telebirr")]
    Telebirr,
    #[sea_orm(string_value = "cbe")]
    Cbe,
    #[sea_orm(string_value = "dashen")]
    Dashen,
}

/// Review state of an order. `Pending` is initial, the other two are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl OrderStatus {
    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Internal row identifier
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    /// Public tracking identifier, `ORD-<year>-<NNNN>`
    #[sea_orm(unique)]
    pub order_id: String,
    /// Customer who placed the order
    pub user_id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub delivery_method: DeliveryMethod,
    /// Requested delivery or pickup date
    pub selected_date: Date,
    pub delivery_notes: Option<String>,
    pub payment_method: PaymentMethod,
    /// Reference of the externally verified payment
    pub transaction_reference: String,
    /// Proof-of-payment (receipt) reference
    pub receipt_url: String,
    pub status: OrderStatus,
    /// Note left by the reviewing admin
    pub admin_note: Option<String>,
    /// Coupon applied at checkout, if any
    pub coupon_id: Option<i64>,
    /// Sum of line totals
    #[sea_orm(column_type = "Text")]
    pub subtotal: Money,
    /// Coupon discount, never above `subtotal`
    #[sea_orm(column_type = "Text")]
    pub discount_amount: Money,
    /// `subtotal - discount_amount`
    #[sea_orm(column_type = "Text")]
    pub total_amount: Money,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::audit_log::Entity")]
    AuditLogs,
    #[sea_orm(
        belongs_to = "super::coupon::Entity",
        from = "Column::CouponId",
        to = "super::coupon::Column::Id",
        on_delete = "SetNull"
    )]
    Coupon,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::audit_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditLogs.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
