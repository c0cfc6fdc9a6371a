//! Core business logic, independent of the HTTP layer.
//!
//! Leaf services first: [`coupon`] and [`inventory`] are composed by [`checkout`] into
//! order creation, and [`status`] drives the admin review that follows.

/// Caller identity and capability checks
pub mod auth;
/// Atomic order creation
pub mod checkout;
/// Coupon eligibility, discount calculation and redemption
pub mod coupon;
/// Guarded stock reservation and restoration
pub mod inventory;
/// Order identifiers, lookups, listings and stats
pub mod order;
/// Minimal catalog operations checkout relies on
pub mod product;
/// Admin verify/reject transitions with audit trail
pub mod status;
