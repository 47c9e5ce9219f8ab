//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Storage and upstream failures are logged server-side and surfaced as a
//! generic body; validation and duplicate-submission failures carry their
//! message to the caller. No request-scoped error is fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{JokeId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid rating 7: must be between 1 and 5",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                |
/// |-----------|---------------------|----------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request            |
/// | 2000–2999 | State / Not Found   | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / Upstream   | 500 / 504                  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Rating value outside the accepted `1..=5` range.
    #[error("invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Joke with the given id was not found. Ratings never upsert.
    #[error("joke not found: {0}")]
    JokeNotFound(JokeId),

    /// User account with the given id was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A registered user already rated this joke.
    #[error("already rated joke {0}")]
    DuplicateRating(JokeId),

    /// Persistence layer failure. Detail is logged, not leaked.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// External seed source did not respond in time. Always recovered
    /// by falling back to static content before reaching a handler.
    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRating(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::JokeNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::DuplicateRating(_) => 2003,
            Self::StorageUnavailable(_) => 3001,
            Self::UpstreamTimeout(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRating(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::JokeNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateRating(_) => StatusCode::CONFLICT,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::StorageUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` when the variant's message is safe to surface to
    /// the caller. Server-side failures get a generic body instead.
    #[must_use]
    const fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidRating(_)
                | Self::InvalidRequest(_)
                | Self::JokeNotFound(_)
                | Self::UserNotFound(_)
                | Self::DuplicateRating(_)
        )
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_client_facing() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message,
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(
            GatewayError::InvalidRating(7).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::InvalidRating(0).error_code(), 1001);
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let err = GatewayError::DuplicateRating(JokeId::new("official_9"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2003);
    }

    #[test]
    fn storage_failure_is_not_client_facing() {
        let err = GatewayError::StorageUnavailable("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_client_facing());
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = GatewayError::JokeNotFound(JokeId::new("official_404"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
