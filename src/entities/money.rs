//! Money column type - Exact two-decimal amounts stored as TEXT.
//!
//! SQLite has no decimal type and sea-orm reads `Decimal` columns back through `f64` there,
//! so amounts are persisted as their canonical `"1234.50"` string instead and parsed back
//! without loss. The trait impls follow what `DeriveValueType` generates for string-backed
//! enums.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value,
    sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr},
};
use serde::{Deserialize, Serialize};
use std::{fmt, iter::Sum, str::FromStr};

/// Decimal places kept on every amount
pub const MONEY_SCALE: u32 = 2;

/// A non-negative amount with at most two decimal places.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// 0.00
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// 99 999 999.99, the largest amount any money column accepts
    pub const MAX: Self = Self(Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE));

    /// Wraps an amount already known to be valid (computed from validated inputs).
    #[must_use]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Validates user input for `field`: non-negative, at most two decimal places, and no
    /// larger than [`Money::MAX`].
    pub fn parse_input(field: &str, amount: Decimal) -> Result<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::validation(field, "Amount cannot be negative"));
        }
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(Error::validation(
                field,
                "Amount cannot have more than 2 decimal places",
            ));
        }
        if amount > Self::MAX.0 {
            return Err(Error::validation(
                field,
                format!("Amount cannot exceed {}", Self::MAX),
            ));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<Decimal> for Money {
    fn partial_cmp(&self, other: &Decimal) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

impl From<Money> for Value {
    fn from(money: Money) -> Self {
        money.to_string().into()
    }
}

impl TryGetable for Money {
    fn try_get_by<I: ColIdx>(res: &QueryResult, idx: I) -> std::result::Result<Self, TryGetError> {
        let raw = String::try_get_by(res, idx)?;
        raw.parse()
            .map_err(|e| TryGetError::DbErr(DbErr::Type(format!("invalid money {raw:?}: {e}"))))
    }
}

impl ValueType for Money {
    fn try_from(v: Value) -> std::result::Result<Self, ValueTypeErr> {
        let raw = <String as ValueType>::try_from(v)?;
        raw.parse().map_err(|_| ValueTypeErr)
    }

    fn type_name() -> String {
        "Money".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for Money {
    fn null() -> Value {
        Value::String(None)
    }
}
