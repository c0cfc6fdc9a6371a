//! Order aggregate - Identifier generation, lookups, listings and stats.
//!
//! Public identifiers have the form `ORD-<year>-<NNNN>`. Numbers come from a per-year counter
//! row in `order_sequences` that is incremented in place, inside the caller's transaction.

use crate::{
    core::auth::Actor,
    entities::{
        Money, Order, OrderItem, OrderSequence,
        order::{self, OrderStatus, PaymentMethod},
        order_item, order_sequence,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    Condition, LoaderTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Prefix shared by every identifier issued in `year`.
#[must_use]
pub fn order_id_prefix(year: i32) -> String {
    format!("ORD-{year}-")
}

/// Formats a public identifier, zero-padding the sequence to four digits.
#[must_use]
pub fn format_order_id(year: i32, sequence: i32) -> String {
    format!("{}{sequence:04}", order_id_prefix(year))
}

/// Numeric sequence of `order_id` if it was issued in `year`.
///
/// Parsed as a number so `ORD-2025-10000` ranks above `ORD-2025-9999`.
#[must_use]
pub fn parse_sequence(order_id: &str, year: i32) -> Option<i32> {
    order_id
        .strip_prefix(&order_id_prefix(year))
        .and_then(|suffix| suffix.parse::<i32>().ok())
}

/// Highest sequence among orders already stored for `year`, or 0.
async fn highest_existing_sequence<C>(db: &C, year: i32) -> Result<i32>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = Order::find()
        .select_only()
        .column(order::Column::OrderId)
        .filter(order::Column::OrderId.starts_with(order_id_prefix(year)))
        .into_tuple()
        .all(db)
        .await?;

    Ok(ids
        .iter()
        .filter_map(|id| parse_sequence(id, year))
        .max()
        .unwrap_or(0))
}

async fn bump_sequence<C>(db: &C, year: i32) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = OrderSequence::update_many()
        .col_expr(
            order_sequence::Column::LastValue,
            Expr::col(order_sequence::Column::LastValue).add(1),
        )
        .col_expr(order_sequence::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order_sequence::Column::Year.eq(year))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Draws the next public identifier for `year`.
///
/// Must run inside the transaction that inserts the order. The counter row is incremented
/// with a single `UPDATE`, which holds its lock until commit, so concurrent checkouts get
/// distinct consecutive numbers. The first order of a year seeds the counter from the
/// highest identifier already stored.
#[instrument(skip(db))]
pub async fn next_order_id<C>(db: &C, year: i32) -> Result<String>
where
    C: ConnectionTrait,
{
    if bump_sequence(db, year).await? == 0 {
        let floor = highest_existing_sequence(db, year).await?;
        let seed = order_sequence::ActiveModel {
            year: Set(year),
            last_value: Set(floor + 1),
            updated_at: Set(Utc::now()),
        };
        let inserted = OrderSequence::insert(seed)
            .on_conflict(
                OnConflict::column(order_sequence::Column::Year)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        // Another checkout seeded the year first
        if inserted == 0 {
            bump_sequence(db, year).await?;
        }
    }

    let sequence = OrderSequence::find_by_id(year)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("order sequence for {year}")))?;

    let order_id = format_order_id(year, sequence.last_value);
    debug!("Issued order id {}", order_id);
    Ok(order_id)
}

/// Finds an order by its public identifier.
pub async fn get_order_by_order_id<C>(db: &C, order_id: &str) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::OrderId.eq(order_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Line items of an order, in insertion order.
pub async fn get_items<C>(db: &C, order_row_id: i64) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_row_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches an order with its items for tracking.
///
/// Customers can only see their own orders; someone else's order reports as not found so
/// identifiers cannot be enumerated.
pub async fn get_order_for(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: &str,
) -> Result<OrderWithItems> {
    let order = get_order_by_order_id(db, order_id)
        .await?
        .filter(|order| actor.can_view(order))
        .ok_or_else(|| Error::OrderNotFound {
            order_id: order_id.to_string(),
        })?;
    let items = get_items(db, order.id).await?;
    Ok(OrderWithItems { order, items })
}

async fn attach_items(
    db: &DatabaseConnection,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderWithItems>> {
    let items = orders.load_many(OrderItem, db).await?;
    Ok(orders
        .into_iter()
        .zip(items)
        .map(|(order, items)| OrderWithItems { order, items })
        .collect())
}

/// The caller's own orders, newest first.
pub async fn list_my_orders(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<OrderWithItems>> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(actor.user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    attach_items(db, orders).await
}

/// Admin listing filters. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    /// Inclusive lower bound on `created_at`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub date_to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(order::Column::Status.eq(status));
        }
        if let Some(method) = self.payment_method {
            condition = condition.add(order::Column::PaymentMethod.eq(method));
        }
        if let Some(from) = self.date_from {
            condition = condition.add(order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = self.date_to {
            condition = condition.add(order::Column::CreatedAt.lte(to));
        }
        condition
    }
}

/// All orders matching `filter`, newest first. Admin only.
pub async fn list_orders(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: &OrderFilter,
) -> Result<Vec<OrderWithItems>> {
    actor.require_admin("list all orders")?;
    let orders = Order::find()
        .filter(filter.condition())
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    attach_items(db, orders).await
}

/// Dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub verified_orders: u64,
    pub rejected_orders: u64,
    /// Sum of `total_amount` over verified orders
    pub revenue: Decimal,
}

async fn count_with_status(db: &DatabaseConnection, status: OrderStatus) -> Result<u64> {
    Order::find()
        .filter(order::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Order counts per status and verified revenue. Admin only.
pub async fn order_stats(db: &DatabaseConnection, actor: &Actor) -> Result<OrderStats> {
    actor.require_admin("view order stats")?;

    let verified_totals: Vec<Money> = Order::find()
        .select_only()
        .column(order::Column::TotalAmount)
        .filter(order::Column::Status.eq(OrderStatus::Verified))
        .into_tuple()
        .all(db)
        .await?;

    Ok(OrderStats {
        total_orders: Order::find().count(db).await?,
        pending_orders: count_with_status(db, OrderStatus::Pending).await?,
        verified_orders: count_with_status(db, OrderStatus::Verified).await?,
        rejected_orders: count_with_status(db, OrderStatus::Rejected).await?,
        revenue: verified_totals.into_iter().map(Money::amount).sum(),
    })
}
