//! Checkout orchestrator - Turns a cart into a persisted order in one transaction.
//!
//! Sequence, all inside a single database transaction:
//! 1. reserve stock for every line item (guarded check-and-decrement per product)
//! 2. compute the subtotal from the captured unit prices
//! 3. resolve and validate the coupon, enforce its minimum purchase, compute the discount
//! 4. draw the next `ORD-<year>-<NNNN>` identifier
//! 5. insert the order (status `pending`) and its line item snapshots
//! 6. redeem the coupon
//!
//! Any error drops the transaction, which rolls back stock, counter and coupon changes
//! together. Input validation runs before the transaction starts.

use crate::{
    core::{
        auth::Actor,
        coupon, inventory,
        order::{OrderWithItems, next_order_id},
    },
    entities::{
        Money,
        order::{self, DeliveryMethod, OrderStatus, PaymentMethod},
        order_item, product,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// One requested line
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRequest {
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price shown to the customer, captured on the order. At most two decimal places.
    pub unit_price: Decimal,
}

/// Everything the customer submits at checkout
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub delivery_method: DeliveryMethod,
    pub selected_date: NaiveDate,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub transaction_reference: String,
    pub receipt_url: String,
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

fn require_text(field: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, message));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects malformed requests before anything is touched.
pub fn validate_request(request: &CheckoutRequest) -> Result<()> {
    require_text("full_name", &request.full_name, "Full name is required")?;
    require_text("phone", &request.phone, "Phone number is required")?;
    require_text(
        "transaction_reference",
        &request.transaction_reference,
        "Transaction reference is required",
    )?;
    require_text("receipt_url", &request.receipt_url, "Payment receipt is required")?;

    if request.delivery_method == DeliveryMethod::Delivery
        && request
            .address
            .as_deref()
            .is_none_or(|address| address.trim().is_empty())
    {
        return Err(Error::validation("address", "Please enter delivery address"));
    }

    if request.items.is_empty() {
        return Err(Error::validation("items", "Order must contain at least one item"));
    }
    for item in &request.items {
        if item.quantity < 1 {
            return Err(Error::validation("quantity", "Quantity must be at least 1"));
        }
        Money::parse_input("unit_price", item.unit_price)?;
    }
    subtotal_of(&request.items)?;

    if request
        .coupon_code
        .as_deref()
        .is_some_and(|code| code.trim().is_empty())
    {
        return Err(Error::validation("coupon_code", "Coupon code cannot be blank"));
    }

    Ok(())
}

/// Sum of `unit_price * quantity` over `items`.
///
/// Fails with a validation error on `items` when the sum overflows or exceeds [`Money::MAX`].
fn subtotal_of(items: &[LineItemRequest]) -> Result<Money> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| {
            item.unit_price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| acc.checked_add(line))
        })
        .filter(|total| *total <= Money::MAX.amount())
        .map(Money::from_decimal)
        .ok_or_else(|| {
            Error::validation("items", format!("Order total cannot exceed {}", Money::MAX))
        })
}

/// Places an order for `actor` at the current time.
pub async fn place_order(
    db: &DatabaseConnection,
    actor: &Actor,
    request: CheckoutRequest,
) -> Result<OrderWithItems> {
    place_order_at(db, actor, request, Utc::now()).await
}

/// Places an order as of `now`, which decides coupon expiry and the identifier year.
///
/// # Errors
/// * `Error::Validation` - malformed request
/// * `Error::ProductNotFound` / `Error::InsufficientStock` - a line item cannot be reserved
/// * `Error::InvalidCoupon`, `CouponInactive`, `CouponExpired`, `CouponLimitReached`,
///   `BelowMinimumPurchase` - the coupon cannot be applied
/// * `Error::Database` - persistence failure
///
/// On any error nothing is persisted.
#[instrument(skip(db, request), fields(user_id = actor.user_id, items = request.items.len()))]
pub async fn place_order_at(
    db: &DatabaseConnection,
    actor: &Actor,
    request: CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<OrderWithItems> {
    validate_request(&request)?;
    let subtotal = subtotal_of(&request.items)?;

    let txn = db.begin().await?;

    let mut reserved: Vec<(&LineItemRequest, product::Model)> =
        Vec::with_capacity(request.items.len());
    for item in &request.items {
        let product = inventory::reserve(&txn, item.product_id, item.quantity).await?;
        reserved.push((item, product));
    }

    let applied = match request.coupon_code.as_deref() {
        Some(code) => {
            let coupon = coupon::find_by_code(&txn, code)
                .await?
                .ok_or_else(|| Error::InvalidCoupon {
                    code: coupon::normalize_code(code),
                })?;
            coupon::validate(&coupon, now)?;
            if coupon.min_purchase_amount > subtotal {
                return Err(Error::BelowMinimumPurchase {
                    required: coupon.min_purchase_amount.amount(),
                });
            }
            let discount = coupon::calculate_discount(&coupon, subtotal.amount());
            Some((coupon, discount))
        }
        None => None,
    };

    let discount_amount = applied
        .as_ref()
        .map_or(Decimal::ZERO, |(_, discount)| *discount);
    let total_amount = Money::from_decimal(subtotal.amount() - discount_amount);
    let discount_amount = Money::from_decimal(discount_amount);

    let order_id = next_order_id(&txn, now.year()).await?;

    let order = order::ActiveModel {
        order_id: Set(order_id),
        user_id: Set(actor.user_id),
        full_name: Set(request.full_name.trim().to_string()),
        phone: Set(request.phone.trim().to_string()),
        email: Set(non_blank(request.email.clone())),
        address: Set(non_blank(request.address.clone())),
        delivery_method: Set(request.delivery_method),
        selected_date: Set(request.selected_date),
        delivery_notes: Set(non_blank(request.delivery_notes.clone())),
        payment_method: Set(request.payment_method),
        transaction_reference: Set(request.transaction_reference.trim().to_string()),
        receipt_url: Set(request.receipt_url.trim().to_string()),
        status: Set(OrderStatus::Pending),
        admin_note: Set(None),
        coupon_id: Set(applied.as_ref().map(|(coupon, _)| coupon.id)),
        subtotal: Set(subtotal),
        discount_amount: Set(discount_amount),
        total_amount: Set(total_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(reserved.len());
    for (item, product) in reserved {
        let line = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(Some(product.id)),
            product_name: Set(product.name),
            quantity: Set(item.quantity),
            price: Set(Money::from_decimal(item.unit_price)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(line);
    }

    if let Some((coupon, _)) = &applied {
        coupon::redeem(&txn, coupon.id).await?;
    }

    txn.commit().await?;

    info!(
        "Placed order {} for user {}: subtotal={}, discount={}, total={}, coupon={:?}",
        order.order_id,
        actor.user_id,
        order.subtotal,
        order.discount_amount,
        order.total_amount,
        applied.as_ref().map(|(coupon, _)| coupon.code.as_str())
    );

    Ok(OrderWithItems { order, items })
}
