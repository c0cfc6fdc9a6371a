//! Unified error type for the storefront backend.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants map one-to-one to the
//! failure kinds callers need to tell apart: input validation, stock, coupon eligibility,
//! missing records, capability checks and illegal status transitions.

use crate::entities::order::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// All errors produced by the storefront core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input, rejected before any side effect
    #[error("{message}")]
    Validation {
        /// Input field at fault
        field: String,
        /// Human-readable explanation
        message: String,
    },

    /// A line item asks for more units than the product has in stock
    #[error("{product_name} has insufficient stock. Available: {available}")]
    InsufficientStock {
        /// Product that ran short
        product_id: i64,
        /// Product display name
        product_name: String,
        /// Units currently in stock
        available: i32,
    },

    /// No coupon exists with the supplied code
    #[error("Invalid coupon code")]
    InvalidCoupon {
        /// Normalised code that was looked up
        code: String,
    },

    /// Coupon was switched off by an admin
    #[error("Coupon is inactive")]
    CouponInactive,

    /// Coupon's expiry date has passed
    #[error("Coupon has expired")]
    CouponExpired,

    /// Every use of the coupon has been redeemed
    #[error("Coupon usage limit reached")]
    CouponLimitReached,

    /// No coupon has the id an admin asked for
    #[error("Coupon {coupon_id} not found")]
    CouponNotFound {
        /// Coupon row id
        coupon_id: i64,
    },

    /// Subtotal is below the coupon's minimum purchase amount
    #[error("Minimum purchase amount is {required}")]
    BelowMinimumPurchase {
        /// Minimum subtotal the coupon requires
        required: Decimal,
    },

    /// No order with that identifier is visible to the caller
    #[error("Order {order_id} not found")]
    OrderNotFound {
        /// Public order identifier
        order_id: String,
    },

    /// Line item names a product that does not exist
    #[error("Product {product_id} not found")]
    ProductNotFound {
        /// Catalog identifier
        product_id: i64,
    },

    /// Caller identity missing or malformed
    #[error("Authentication required")]
    Unauthorized,

    /// Caller is authenticated but lacks the capability
    #[error("Not permitted to {action}")]
    Forbidden {
        /// Action that was refused
        action: String,
    },

    /// Status change not allowed from the order's current status
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `field`.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Database(_) => "database",
            Self::Io(_) => "io",
            Self::Validation { .. } => "validation",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InvalidCoupon { .. } => "invalid_coupon",
            Self::CouponInactive => "coupon_inactive",
            Self::CouponExpired => "coupon_expired",
            Self::CouponLimitReached => "coupon_limit_reached",
            Self::BelowMinimumPurchase { .. } => "below_minimum_purchase",
            Self::OrderNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::CouponNotFound { .. } => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidTransition { .. } => "invalid_transition",
        }
    }

    /// The input field to blame, falling back to [`Error::kind`].
    #[must_use]
    pub fn field_or_kind(&self) -> String {
        match self {
            Self::Validation { field, .. } => field.clone(),
            Self::InvalidCoupon { .. }
            | Self::CouponInactive
            | Self::CouponExpired
            | Self::CouponLimitReached => "code".to_string(),
            Self::BelowMinimumPurchase { .. } => "amount".to_string(),
            other => other.kind().to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
