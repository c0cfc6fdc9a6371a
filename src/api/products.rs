//! Catalog reads for the storefront.

use super::{AppState, error::ApiError};
use crate::{core::product, entities::product as product_entity};
use axum::{Json, extract::State};

/// `GET /api/products` - products currently in stock, by name. No identity required.
pub async fn list_available(
    State(state): State<AppState>,
) -> Result<Json<Vec<product_entity::Model>>, ApiError> {
    Ok(Json(product::get_available_products(&state.db).await?))
}
