//! Joke-related DTOs for random, rate, and top-rated operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{JokeSummary, RatingStats};

/// A joke card as served by `GET /jokes/random` and `GET /jokes/top-rated`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JokeCard {
    /// Joke identifier.
    pub id: String,
    /// Joke text (setup and punchline joined).
    pub text: String,
    /// Category label.
    pub category: String,
    /// Mean rating rounded to one decimal; `0.0` when unrated.
    pub average_rating: f64,
    /// Total rating count.
    pub total_ratings: u64,
}

impl From<JokeSummary> for JokeCard {
    fn from(summary: JokeSummary) -> Self {
        Self {
            id: summary.joke_id.to_string(),
            text: summary.text,
            category: summary.category,
            average_rating: summary.average_rating,
            total_ratings: summary.total_ratings,
        }
    }
}

/// Request body for `POST /jokes/{id}/rate`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct RateJokeRequest {
    /// Rating value, must be an integer in `1..=5`.
    pub rating: u8,
}

/// Response body for a successful rating submission.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RateJokeResponse {
    /// Always `true` on success.
    pub success: bool,
    /// New mean rating rounded to one decimal.
    pub average_rating: f64,
    /// New total rating count.
    pub total_ratings: u64,
    /// New registered rating count.
    pub registered_ratings: u64,
}

impl From<RatingStats> for RateJokeResponse {
    fn from(stats: RatingStats) -> Self {
        Self {
            success: true,
            average_rating: stats.average_rating,
            total_ratings: stats.total_ratings,
            registered_ratings: stats.registered_ratings,
        }
    }
}
