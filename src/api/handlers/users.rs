//! User endpoint handlers: registration and profile lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{RegisterUserRequest, UserProfileResponse};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users` — Register a new account.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed input or a taken
/// username/email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a user",
    description = "Creates an account with zeroed lifetime counters. Credential handling and token issuance live in the upstream auth service.",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfileResponse),
        (status = 400, description = "Invalid or duplicate username/email", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let account = state
        .voting_service
        .register_user(&req.username, &req.email)
        .await?;

    Ok((StatusCode::CREATED, Json(UserProfileResponse::from(account))))
}

/// `GET /users/{id}` — Fetch a profile with lifetime counters.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for unknown ids.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get a user profile",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Profile with counters", body = UserProfileResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let account = state
        .voting_service
        .user_profile(UserId::from_uuid(id))
        .await?;

    Ok(Json(UserProfileResponse::from(account)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", get(profile))
}
