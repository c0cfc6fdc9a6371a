//! Inventory guard - Stock reservation and restoration.
//!
//! Each mutation is one guarded `UPDATE` on the product row. The row stays write-locked until
//! the enclosing transaction ends, so concurrent checkouts for the same product serialize and
//! a failure later in the transaction rolls every reservation back. `is_available` is
//! recomputed in the same statement so it always matches `stock > 0`.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Takes `quantity` units of a product out of stock.
///
/// Check and decrement are a single statement:
/// `UPDATE products SET stock = stock - q, is_available = (stock > q) WHERE id = ? AND stock >= q`.
/// When no row matches, nothing has changed and the product is re-read to report why.
///
/// # Errors
/// * `Error::Validation` - `quantity` is below 1
/// * `Error::ProductNotFound` - no such product
/// * `Error::InsufficientStock` - fewer than `quantity` units on hand
#[instrument(skip(db))]
pub async fn reserve<C>(db: &C, product_id: i64, quantity: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if quantity < 1 {
        return Err(Error::validation("quantity", "Quantity must be at least 1"));
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(
            product::Column::IsAvailable,
            Expr::col(product::Column::Stock).gt(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?;

    if result.rows_affected == 0 {
        debug!(
            "Reservation of {} x product {} refused, {} in stock",
            quantity, product_id, product.stock
        );
        return Err(Error::InsufficientStock {
            product_id,
            product_name: product.name,
            available: product.stock,
        });
    }

    Ok(product)
}

/// Puts `quantity` units of a product back into stock and marks it available.
///
/// # Errors
/// * `Error::Validation` - `quantity` is below 1
/// * `Error::ProductNotFound` - no such product
#[instrument(skip(db))]
pub async fn restore<C>(db: &C, product_id: i64, quantity: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if quantity < 1 {
        return Err(Error::validation("quantity", "Quantity must be at least 1"));
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(quantity),
        )
        .col_expr(product::Column::IsAvailable, Expr::value(true))
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { product_id });
    }

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })
}
