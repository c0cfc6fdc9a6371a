//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod audit_log;
pub mod coupon;
pub mod money;
pub mod order;
pub mod order_item;
pub mod order_sequence;
pub mod product;

// Re-export specific types to avoid conflicts
pub use audit_log::{Column as AuditLogColumn, Entity as AuditLog, Model as AuditLogModel};
pub use money::Money;
pub use coupon::{Column as CouponColumn, Entity as Coupon, Model as CouponModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use order_sequence::{
    Column as OrderSequenceColumn, Entity as OrderSequence, Model as OrderSequenceModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
