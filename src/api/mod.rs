//! HTTP surface over the core workflow.
//!
//! Handlers stay thin: they extract the caller and payload, call into [`crate::core`], and
//! let [`error::ApiError`] render failures as `{field_or_kind, message}`.

pub mod coupons;
pub mod error;
pub mod identity;
pub mod orders;
pub mod products;

use crate::config::settings::OrderPolicy;
use axum::{
    Json, Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// `[orders]` settings
    pub policy: OrderPolicy,
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "storefront"}))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(products::list_available))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/orders/mine", get(orders::my_orders))
        .route("/api/orders/stats", get(orders::stats))
        .route("/api/orders/:order_id", get(orders::get_order))
        .route("/api/orders/:order_id/verify", post(orders::verify))
        .route("/api/orders/:order_id/reject", post(orders::reject))
        .route("/api/orders/:order_id/audit-logs", get(orders::audit_logs))
        .route("/api/coupons", get(coupons::list).post(coupons::create))
        .route("/api/coupons/validate", post(coupons::validate))
        .route(
            "/api/coupons/:coupon_id",
            get(coupons::get)
                .patch(coupons::update)
                .delete(coupons::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
