//! Shared test utilities for the storefront backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        auth::Actor,
        checkout::{self, CheckoutRequest, LineItemRequest},
        coupon::{self, NewCoupon},
        order::OrderWithItems,
        product,
    },
    entities::{
        self, Money,
        coupon::DiscountType,
        order::{DeliveryMethod, OrderStatus, PaymentMethod},
    },
    errors::{Error, Result},
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::PathBuf;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// An on-disk `SQLite` database behind a multi-connection pool, deleted on drop.
///
/// Unlike [`setup_test_db`], concurrent transactions here run on separate connections and
/// contend for `SQLite`'s write lock.
pub struct FileTestDb {
    /// Pooled connection to the file
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileTestDb {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Creates a fresh file-backed database under the system temp directory.
pub async fn setup_file_test_db(name: &str) -> Result<FileTestDb> {
    let path = std::env::temp_dir().join(format!(
        "storefront-{name}-{}-{}.sqlite",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = crate::config::database::create_connection(&url).await?;
    let file_db = FileTestDb { db, path };
    crate::config::database::create_tables(&file_db.db).await?;
    Ok(file_db)
}

/// Creates a catalog product.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: Decimal,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(db, name.to_string(), price, stock).await
}

/// Creates a coupon with sensible defaults.
///
/// # Defaults
/// * `usage_limit`: 1
/// * `min_purchase_amount`: 0
/// * `expiry_date`: 30 days from now
pub async fn create_test_coupon(
    db: &DatabaseConnection,
    code: &str,
    discount_type: DiscountType,
    value: Decimal,
) -> Result<entities::coupon::Model> {
    create_custom_coupon(db, code, discount_type, value, 1, Decimal::ZERO).await
}

/// Creates a coupon with custom limits.
pub async fn create_custom_coupon(
    db: &DatabaseConnection,
    code: &str,
    discount_type: DiscountType,
    value: Decimal,
    usage_limit: i32,
    min_purchase_amount: Decimal,
) -> Result<entities::coupon::Model> {
    coupon::create_coupon(
        db,
        &Actor::admin(1),
        NewCoupon {
            code: code.to_string(),
            discount_type,
            value,
            expiry_date: Utc::now() + Duration::days(30),
            usage_limit,
            min_purchase_amount,
            active: true,
        },
    )
    .await
}

/// A valid delivery checkout for `items`, paid via Telebirr, without a coupon.
#[must_use]
pub fn sample_checkout(items: Vec<LineItemRequest>) -> CheckoutRequest {
    CheckoutRequest {
        full_name: "Abebe Kebede".to_string(),
        phone: "+251911000000".to_string(),
        email: Some("abebe@example.com".to_string()),
        address: Some("Bole, Addis Ababa".to_string()),
        delivery_method: DeliveryMethod::Delivery,
        selected_date: NaiveDate::from_ymd_opt(2025, 9, 27).unwrap_or_default(),
        delivery_notes: None,
        payment_method: PaymentMethod::Telebirr,
        transaction_reference: "TB-20250927-0001".to_string(),
        receipt_url: "receipts/tb-0001.jpg".to_string(),
        items,
        coupon_code: None,
    }
}

async fn line_for(
    db: &DatabaseConnection,
    product_id: i64,
    quantity: i32,
) -> Result<LineItemRequest> {
    let product = product::get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?;
    Ok(LineItemRequest {
        product_id,
        quantity,
        unit_price: product.price.amount(),
    })
}

/// Places a single-line order at the product's catalog price.
pub async fn place_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<OrderWithItems> {
    let line = line_for(db, product_id, quantity).await?;
    checkout::place_order(db, &Actor::customer(user_id), sample_checkout(vec![line])).await
}

/// Places a single-line order that applies `code`.
pub async fn place_test_order_with_coupon(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    code: &str,
) -> Result<OrderWithItems> {
    let line = line_for(db, product_id, quantity).await?;
    let mut request = sample_checkout(vec![line]);
    request.coupon_code = Some(code.to_string());
    checkout::place_order(db, &Actor::customer(user_id), request).await
}

/// Inserts a bare pending order with a fixed public identifier, bypassing checkout.
pub async fn insert_order_with_id(
    db: &DatabaseConnection,
    order_id: &str,
) -> Result<entities::order::Model> {
    let now = Utc::now();
    entities::order::ActiveModel {
        order_id: Set(order_id.to_string()),
        user_id: Set(1),
        full_name: Set("Legacy Customer".to_string()),
        phone: Set("+251900000000".to_string()),
        email: Set(None),
        address: Set(None),
        delivery_method: Set(DeliveryMethod::Pickup),
        selected_date: Set(now.date_naive()),
        delivery_notes: Set(None),
        payment_method: Set(PaymentMethod::Cbe),
        transaction_reference: Set("CBE-LEGACY".to_string()),
        receipt_url: Set("receipts/legacy.jpg".to_string()),
        status: Set(OrderStatus::Pending),
        admin_note: Set(None),
        coupon_id: Set(None),
        subtotal: Set(Money::ZERO),
        discount_amount: Set(Money::ZERO),
        total_amount: Set(Money::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}
