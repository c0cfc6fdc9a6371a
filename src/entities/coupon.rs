//! Coupon entity - Discount codes redeemable at checkout.
//!
//! The stored `discount_type`/`value` pair is exposed to business logic as a single
//! [`DiscountKind`] so discount calculation can match exhaustively instead of comparing strings.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a coupon's `value` is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` is a percentage of the subtotal
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// `value` is a flat amount off the subtotal
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

/// A coupon's discount rule with its parameter attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscountKind {
    /// Percentage of the amount, in `(0, 100]`
    Percentage(Decimal),
    /// Flat amount, `>= 0`
    Fixed(Decimal),
}

/// Coupon database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Redemption code, always stored uppercase
    #[sea_orm(unique)]
    pub code: String,
    /// Percentage or fixed discount
    pub discount_type: DiscountType,
    /// Percentage rate or flat amount depending on `discount_type`
    #[sea_orm(column_type = "Text")]
    pub value: Money,
    /// Last instant at which the coupon may be redeemed
    pub expiry_date: DateTimeUtc,
    /// Maximum number of redemptions
    pub usage_limit: i32,
    /// Redemptions so far; never exceeds `usage_limit`
    pub used_count: i32,
    /// Admin switch to disable the coupon
    pub active: bool,
    /// Smallest subtotal the coupon applies to
    #[sea_orm(column_type = "Text")]
    pub min_purchase_amount: Money,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
    /// When the coupon was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// The discount rule carried by this coupon.
    #[must_use]
    pub const fn discount_kind(&self) -> DiscountKind {
        match self.discount_type {
            DiscountType::Percentage => DiscountKind::Percentage(self.value.amount()),
            DiscountType::Fixed => DiscountKind::Fixed(self.value.amount()),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Orders that applied this coupon
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
