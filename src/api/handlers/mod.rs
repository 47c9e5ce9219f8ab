//! REST endpoint handlers organized by resource.

pub mod foxes;
pub mod jokes;
pub mod system;
pub mod users;

use axum::Router;
use axum::http::HeaderMap;

use crate::app_state::AppState;
use crate::domain::UserId;

/// Extracts the authenticated user id from the `x-user-id` header.
///
/// Token verification happens upstream; a missing or malformed header
/// means an anonymous request, never a rejection.
#[must_use]
pub fn submitter_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<uuid::Uuid>().ok())
        .map(UserId::from_uuid)
}

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(foxes::routes())
        .merge(jokes::routes())
        .merge(users::routes())
}
