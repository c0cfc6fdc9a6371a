//! Caller identity taken from headers set by the upstream auth gateway.

use super::error::ApiError;
use crate::core::auth::{Actor, Role};
use crate::errors::Error;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Numeric id of the authenticated user
pub const USER_ID_HEADER: &str = "x-user-id";
/// `customer` or `admin`, case-insensitive
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_role(raw: &str) -> Option<Role> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "customer" => Some(Role::Customer),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .ok_or(Error::Unauthorized)?;
        let role = header(parts, USER_ROLE_HEADER)
            .and_then(parse_role)
            .ok_or(Error::Unauthorized)?;
        Ok(Self { user_id, role })
    }
}
