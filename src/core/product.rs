//! Product business logic - The catalog operations checkout relies on.
//!
//! Catalog management proper lives elsewhere; this module only creates and looks up the
//! products whose price and stock the order workflow reads and adjusts.

use crate::{
    entities::{Money, Product, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Looks a product up by catalog id.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Ok(Product::find_by_id(product_id).one(db).await?)
}

/// Finds a product by its exact name.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists products that are currently in stock, ordered alphabetically.
pub async fn get_available_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsAvailable.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// The name is trimmed and availability is derived from the initial stock.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative, has more than two decimal places or exceeds [`Money::MAX`]
/// - The stock is negative
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    price: Decimal,
    stock: i32,
) -> Result<product::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "Product name cannot be empty"));
    }

    let price = Money::parse_input("price", price)?;

    if stock < 0 {
        return Err(Error::validation("stock", "Stock cannot be negative"));
    }

    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        price: Set(price),
        stock: Set(stock),
        is_available: Set(stock > 0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}
