//! Joke endpoint handlers: random, rate, top-rated.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::submitter_from_headers;
use crate::api::dto::{JokeCard, LimitParams, RateJokeRequest, RateJokeResponse};
use crate::app_state::AppState;
use crate::domain::JokeId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::DEFAULT_TOP_RATED_LIMIT;

/// `GET /jokes/random` — Serve a random joke, seeding it when unseen.
#[utoipa::path(
    get,
    path = "/api/v1/jokes/random",
    tag = "Jokes",
    summary = "Get a random joke",
    description = "Fetches a joke from the upstream source (falling back to a static set on timeout) and returns it with its current rating stats.",
    responses(
        (status = 200, description = "A joke with current stats", body = JokeCard),
    )
)]
pub async fn random_joke(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.voting_service.random_joke().await;
    Json(JokeCard::from(summary))
}

/// `POST /jokes/{id}/rate` — Rate a joke.
///
/// # Errors
///
/// Returns [`GatewayError`] on an out-of-range value, a missing joke,
/// or a duplicate rating from the same registered user.
#[utoipa::path(
    post,
    path = "/api/v1/jokes/{id}/rate",
    tag = "Jokes",
    summary = "Rate a joke",
    description = "Records one rating (1-5) against the joke. Registered users (identified by the x-user-id header) may rate each joke once; anonymous ratings are unrestricted.",
    params(
        ("id" = String, Path, description = "Joke id"),
    ),
    request_body = RateJokeRequest,
    responses(
        (status = 200, description = "Rating recorded", body = RateJokeResponse),
        (status = 400, description = "Rating outside 1-5", body = ErrorResponse),
        (status = 404, description = "Joke not found", body = ErrorResponse),
        (status = 409, description = "Already rated by this user", body = ErrorResponse),
    )
)]
pub async fn rate_joke(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<RateJokeRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let joke_id = JokeId::new(id);
    let submitter = submitter_from_headers(&headers);

    let stats = state
        .voting_service
        .rate_joke(&joke_id, submitter, req.rating)
        .await?;

    Ok(Json(RateJokeResponse::from(stats)))
}

/// `GET /jokes/top-rated` — Top jokes by average rating.
#[utoipa::path(
    get,
    path = "/api/v1/jokes/top-rated",
    tag = "Jokes",
    summary = "List top-rated jokes",
    description = "Jokes with at least one rating, ordered by average rating descending, total ratings breaking ties.",
    params(
        ("limit" = Option<usize>, Query, description = "Row cap, default 10, max 100"),
    ),
    responses(
        (status = 200, description = "Ranked jokes", body = Vec<JokeCard>),
    )
)]
pub async fn top_rated(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let limit = params.resolve(DEFAULT_TOP_RATED_LIMIT);
    let jokes = state.voting_service.top_rated_jokes(limit).await;
    Json(jokes.into_iter().map(JokeCard::from).collect::<Vec<_>>())
}

/// Joke routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jokes/random", get(random_joke))
        .route("/jokes/{id}/rate", post(rate_joke))
        .route("/jokes/top-rated", get(top_rated))
}
