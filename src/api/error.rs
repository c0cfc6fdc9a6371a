//! Rendering of core errors as `{field_or_kind, message}` JSON responses.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Wraps [`Error`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// HTTP status for each failure kind.
#[must_use]
pub const fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. }
        | Error::InsufficientStock { .. }
        | Error::InvalidCoupon { .. }
        | Error::CouponInactive
        | Error::CouponExpired
        | Error::CouponLimitReached
        | Error::BelowMinimumPurchase { .. } => StatusCode::BAD_REQUEST,
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::Forbidden { .. } => StatusCode::FORBIDDEN,
        Error::OrderNotFound { .. }
        | Error::ProductNotFound { .. }
        | Error::CouponNotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidTransition { .. } => StatusCode::CONFLICT,
        Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status.is_server_error() {
            error!("Request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = Json(json!({
            "field_or_kind": self.0.field_or_kind(),
            "message": message,
        }));
        (status, body).into_response()
    }
}
