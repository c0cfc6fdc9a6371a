//! Coupon administration and the public discount preview.

use super::{AppState, error::ApiError};
use crate::{
    core::{
        auth::Actor,
        coupon::{self, CouponQuote, CouponUpdate, CouponView, NewCoupon},
    },
    entities::coupon as coupon_entity,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Body of `POST /api/coupons/validate`
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Code as typed by the customer
    pub code: String,
    /// Purchase amount to price the discount against
    pub amount: Decimal,
}

/// `POST /api/coupons` - admin creates a coupon.
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(new): Json<NewCoupon>,
) -> Result<(StatusCode, Json<coupon_entity::Model>), ApiError> {
    let created = coupon::create_coupon(&state.db, &actor, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/coupons` - admin lists every coupon with its current status.
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<CouponView>>, ApiError> {
    Ok(Json(coupon::list_coupons(&state.db, &actor).await?))
}

/// `GET /api/coupons/:coupon_id`
pub async fn get(
    State(state): State<AppState>,
    actor: Actor,
    Path(coupon_id): Path<i64>,
) -> Result<Json<CouponView>, ApiError> {
    Ok(Json(coupon::get_coupon(&state.db, &actor, coupon_id).await?))
}

/// `PATCH /api/coupons/:coupon_id` - partial update; unknown fields such as `used_count` are
/// rejected by the extractor.
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(coupon_id): Path<i64>,
    Json(changes): Json<CouponUpdate>,
) -> Result<Json<CouponView>, ApiError> {
    Ok(Json(
        coupon::update_coupon(&state.db, &actor, coupon_id, changes).await?,
    ))
}

/// `DELETE /api/coupons/:coupon_id`
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(coupon_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    coupon::delete_coupon(&state.db, &actor, coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/coupons/validate` - any authenticated caller may preview a discount.
pub async fn validate(
    State(state): State<AppState>,
    _actor: Actor,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<CouponQuote>, ApiError> {
    let quote = coupon::quote(&state.db, &request.code, request.amount, Utc::now()).await?;
    Ok(Json(quote))
}
