//! Order sequence entity - Per-year counter behind `ORD-<year>-<NNNN>` identifiers.
//!
//! The counter row is bumped with a single `UPDATE ... SET last_value = last_value + 1`
//! inside the checkout transaction, so two checkouts can never draw the same number.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order sequence database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_sequences")]
pub struct Model {
    /// Calendar year the sequence belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Highest sequence number handed out for `year`
    pub last_value: i32,
    /// When the counter last moved
    pub updated_at: DateTimeUtc,
}

/// `OrderSequence` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
