//! Fox endpoint handlers: random pair, vote, leaderboard, most popular.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::submitter_from_headers;
use crate::api::dto::{FoxCard, LimitParams, RandomPairResponse, VoteResponse};
use crate::app_state::AppState;
use crate::domain::FoxNumber;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::DEFAULT_LEADERBOARD_LIMIT;

/// `GET /foxes/random-pair` — Two distinct foxes to choose between.
#[utoipa::path(
    get,
    path = "/api/v1/foxes/random-pair",
    tag = "Foxes",
    summary = "Get a random fox pair",
    description = "Draws two distinct foxes from the upstream image source, seeding both into storage. Falls back to a static pair when the source is unavailable.",
    responses(
        (status = 200, description = "Two distinct foxes", body = RandomPairResponse),
    )
)]
pub async fn random_pair(State(state): State<AppState>) -> impl IntoResponse {
    let (fox1, fox2) = state.voting_service.random_fox_pair().await;
    Json(RandomPairResponse {
        fox1: FoxCard::from(fox1),
        fox2: FoxCard::from(fox2),
    })
}

/// `POST /foxes/{number}/vote` — Vote for a fox.
///
/// # Errors
///
/// Returns [`GatewayError`] on storage failure; an unseen fox number
/// is created rather than rejected.
#[utoipa::path(
    post,
    path = "/api/v1/foxes/{number}/vote",
    tag = "Foxes",
    summary = "Vote for a fox",
    description = "Records one vote. Unseen fox numbers are created on the fly. Registered users (x-user-id header) also bump their lifetime vote counter.",
    params(
        ("number" = u32, Path, description = "Fox number"),
    ),
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Malformed fox number", body = ErrorResponse),
    )
)]
pub async fn vote(
    State(state): State<AppState>,
    Path(number): Path<u32>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let submitter = submitter_from_headers(&headers);

    let stats = state
        .voting_service
        .submit_vote(FoxNumber::new(number), submitter)
        .await?;

    Ok(Json(VoteResponse::from(stats)))
}

/// `GET /foxes/leaderboard` — Foxes ranked by registered votes.
#[utoipa::path(
    get,
    path = "/api/v1/foxes/leaderboard",
    tag = "Foxes",
    summary = "Fox leaderboard",
    description = "Foxes with at least one registered vote, ordered by registered votes descending.",
    params(
        ("limit" = Option<usize>, Query, description = "Row cap, default 20, max 100"),
    ),
    responses(
        (status = 200, description = "Ranked foxes", body = Vec<FoxCard>),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let limit = params.resolve(DEFAULT_LEADERBOARD_LIMIT);
    let foxes = state.voting_service.fox_leaderboard(limit).await;
    Json(foxes.into_iter().map(FoxCard::from).collect::<Vec<_>>())
}

/// `GET /foxes/top-voted` — Foxes ranked by total votes.
#[utoipa::path(
    get,
    path = "/api/v1/foxes/top-voted",
    tag = "Foxes",
    summary = "Most-voted foxes",
    description = "Foxes with at least one vote of any kind, ordered by total votes descending.",
    params(
        ("limit" = Option<usize>, Query, description = "Row cap, default 20, max 100"),
    ),
    responses(
        (status = 200, description = "Ranked foxes", body = Vec<FoxCard>),
    )
)]
pub async fn top_voted(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let limit = params.resolve(DEFAULT_LEADERBOARD_LIMIT);
    let foxes = state.voting_service.top_voted_foxes(limit).await;
    Json(foxes.into_iter().map(FoxCard::from).collect::<Vec<_>>())
}

/// `GET /foxes/most-popular` — The single most-voted fox.
#[utoipa::path(
    get,
    path = "/api/v1/foxes/most-popular",
    tag = "Foxes",
    summary = "Most popular fox",
    description = "The fox with the highest total vote count, used for the periodic promotional popup. Responds 204 when no fox has any votes yet.",
    responses(
        (status = 200, description = "The most popular fox", body = FoxCard),
        (status = 204, description = "No vote data yet"),
    )
)]
pub async fn most_popular(State(state): State<AppState>) -> impl IntoResponse {
    match state.voting_service.most_popular_fox().await {
        Some(fox) => Json(FoxCard::from(fox)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Fox routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foxes/random-pair", get(random_pair))
        .route("/foxes/{number}/vote", post(vote))
        .route("/foxes/leaderboard", get(leaderboard))
        .route("/foxes/top-voted", get(top_voted))
        .route("/foxes/most-popular", get(most_popular))
}
