//! Checkout, order tracking and the admin review endpoints.

use super::{AppState, error::ApiError};
use crate::{
    core::{
        auth::Actor,
        checkout::{self, CheckoutRequest},
        order::{self, OrderFilter, OrderStats, OrderWithItems},
        status,
    },
    entities::{audit_log, order as order_entity},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Optional admin note on a status change
#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
    /// Stored as the order's `admin_note`
    pub note: Option<String>,
}

/// Response to a verify or reject
#[derive(Debug, Serialize)]
pub struct StatusChanged {
    /// Human-readable outcome
    pub message: String,
    /// Order after the transition
    pub order: order_entity::Model,
}

/// `POST /api/orders` - checkout for the calling customer.
pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>), ApiError> {
    let placed = checkout::place_order(&state.db, &actor, request).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// `GET /api/orders` - admin listing, filtered by the query string.
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    Ok(Json(order::list_orders(&state.db, &actor, &filter).await?))
}

/// `GET /api/orders/mine`
pub async fn my_orders(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    Ok(Json(order::list_my_orders(&state.db, &actor).await?))
}

/// `GET /api/orders/stats` - admin dashboard counters.
pub async fn stats(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<OrderStats>, ApiError> {
    Ok(Json(order::order_stats(&state.db, &actor).await?))
}

/// `GET /api/orders/:order_id` - tracking. Customers only see their own orders.
pub async fn get_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    Ok(Json(order::get_order_for(&state.db, &actor, &order_id).await?))
}

/// `POST /api/orders/:order_id/verify` with an optional `{note}` body.
pub async fn verify(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<String>,
    body: Option<Json<NoteBody>>,
) -> Result<Json<StatusChanged>, ApiError> {
    let note = body.and_then(|Json(b)| b.note);
    let order = status::verify_order(&state.db, &actor, &order_id, note).await?;
    Ok(Json(StatusChanged {
        message: "Order verified successfully".to_string(),
        order,
    }))
}

/// `POST /api/orders/:order_id/reject` with an optional `{note}` body. Restores stock and,
/// per the `[orders]` policy, releases the coupon.
pub async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<String>,
    body: Option<Json<NoteBody>>,
) -> Result<Json<StatusChanged>, ApiError> {
    let note = body.and_then(|Json(b)| b.note);
    let order = status::reject_order(
        &state.db,
        &actor,
        &order_id,
        note,
        state.policy.release_coupon_on_reject,
    )
    .await?;
    Ok(Json(StatusChanged {
        message: "Order rejected and stock restored".to_string(),
        order,
    }))
}

/// `GET /api/orders/:order_id/audit-logs`
pub async fn audit_logs(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<audit_log::Model>>, ApiError> {
    Ok(Json(
        status::get_audit_logs(&state.db, &actor, &order_id).await?,
    ))
}
