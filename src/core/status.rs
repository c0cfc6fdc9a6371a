//! Order status machine - Admin review of pending orders.
//!
//! ```text
//! pending --verify--> verified
//!    \----reject----> rejected (stock restored)
//! ```
//!
//! Both targets are terminal. Every transition writes exactly one audit row in the same
//! transaction as the status change and any compensating stock or coupon updates.

use crate::{
    core::{auth::Actor, coupon, inventory, order::get_items, order::get_order_by_order_id},
    entities::{
        AuditLog, Order, audit_log,
        order::{self, OrderStatus},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument, warn};

const VERIFIED_ACTION: &str = "Order Verified";
const REJECTED_ACTION: &str = "Order Rejected";

/// Moves a pending order to `to`.
///
/// The status is written first with `WHERE status = 'pending'`, so of two admins racing on the
/// same order only one wins and the other gets `InvalidTransition`.
async fn mark(
    txn: &DatabaseTransaction,
    order_id: &str,
    to: OrderStatus,
    note: Option<&str>,
) -> Result<order::Model> {
    let result = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(to))
        .col_expr(order::Column::AdminNote, Expr::value(note.map(str::to_string)))
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::OrderId.eq(order_id))
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .exec(txn)
        .await?;

    let order = get_order_by_order_id(txn, order_id)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            order_id: order_id.to_string(),
        })?;

    if result.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: order.status,
            to,
        });
    }
    Ok(order)
}

async fn append_audit(
    txn: &DatabaseTransaction,
    order: &order::Model,
    admin: &Actor,
    action: &str,
    previous_status: OrderStatus,
) -> Result<audit_log::Model> {
    audit_log::ActiveModel {
        order_id: Set(order.id),
        admin_id: Set(Some(admin.user_id)),
        action: Set(action.to_string()),
        previous_status: Set(previous_status),
        new_status: Set(order.status),
        note: Set(order.admin_note.clone()),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(Into::into)
}

/// Marks a pending order verified and records who did it.
///
/// No stock or coupon side effects.
#[instrument(skip(db, note), fields(admin_id = actor.user_id))]
pub async fn verify_order(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: &str,
    note: Option<String>,
) -> Result<order::Model> {
    actor.require_admin("verify orders")?;

    let txn = db.begin().await?;
    let order = mark(&txn, order_id, OrderStatus::Verified, note.as_deref()).await?;
    append_audit(&txn, &order, actor, VERIFIED_ACTION, OrderStatus::Pending).await?;
    txn.commit().await?;

    info!(
        "Order {} verified by admin {} (pending -> verified)",
        order.order_id, actor.user_id
    );
    Ok(order)
}

/// Rejects a pending order, putting its stock back.
///
/// Every line item's quantity is restored to its product. With `release_coupon` set, the
/// coupon use consumed at checkout is also given back.
#[instrument(skip(db, note), fields(admin_id = actor.user_id))]
pub async fn reject_order(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: &str,
    note: Option<String>,
    release_coupon: bool,
) -> Result<order::Model> {
    actor.require_admin("reject orders")?;

    let txn = db.begin().await?;
    let order = mark(&txn, order_id, OrderStatus::Rejected, note.as_deref()).await?;

    for item in get_items(&txn, order.id).await? {
        match item.product_id {
            Some(product_id) => {
                inventory::restore(&txn, product_id, item.quantity).await?;
            }
            None => warn!(
                "Order {}: product '{}' no longer exists, {} units not restored",
                order.order_id, item.product_name, item.quantity
            ),
        }
    }

    if let Some(coupon_id) = order.coupon_id.filter(|_| release_coupon) {
        coupon::release(&txn, coupon_id).await?;
    }

    append_audit(&txn, &order, actor, REJECTED_ACTION, OrderStatus::Pending).await?;
    txn.commit().await?;

    info!(
        "Order {} rejected by admin {} (pending -> rejected), stock restored",
        order.order_id, actor.user_id
    );
    Ok(order)
}

/// Status history of an order, most recent first. Admin only.
pub async fn get_audit_logs(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: &str,
) -> Result<Vec<audit_log::Model>> {
    actor.require_admin("view audit logs")?;

    let order = get_order_by_order_id(db, order_id)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            order_id: order_id.to_string(),
        })?;

    AuditLog::find()
        .filter(audit_log::Column::OrderId.eq(order.id))
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
