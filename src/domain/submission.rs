//! Submission events and the pure stats aggregators.
//!
//! A [`SubmissionEvent`] is one vote or rating. It is immutable once
//! appended to an entity's event list — there is no update or delete
//! path. [`VoteStats`] and [`RatingStats`] are pure functions over the
//! full event list; they must be recomputed in the same critical
//! section as the append so the persisted counters never drift from
//! the list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::error::GatewayError;

/// Lowest accepted rating value.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating value.
pub const MAX_RATING: u8 = 5;

/// One immutable vote or rating submission.
///
/// Invariant: `is_registered` is true iff `user_id` is present. Use the
/// constructors to keep the two fields in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionEvent {
    /// Submitting user, if registered. Anonymous submissions carry `None`.
    pub user_id: Option<UserId>,
    /// Rating value in `1..=5`. Absent for vote events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Server-side submission timestamp.
    pub date: DateTime<Utc>,
    /// Whether the submitter was a registered user.
    pub is_registered: bool,
}

impl SubmissionEvent {
    /// Creates a vote event (no rating value).
    #[must_use]
    pub fn vote(user_id: Option<UserId>) -> Self {
        Self {
            is_registered: user_id.is_some(),
            user_id,
            rating: None,
            date: Utc::now(),
        }
    }

    /// Creates a rating event after validating the value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRating`] when `value` is outside
    /// `1..=5`.
    pub fn rating(user_id: Option<UserId>, value: u8) -> Result<Self, GatewayError> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(GatewayError::InvalidRating(value));
        }
        Ok(Self {
            is_registered: user_id.is_some(),
            user_id,
            rating: Some(value),
            date: Utc::now(),
        })
    }
}

/// Derived counters for a vote-type entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteStats {
    /// Total number of vote events.
    pub total_votes: u64,
    /// Number of votes from registered users.
    pub registered_votes: u64,
}

impl VoteStats {
    /// Computes vote counters from the full event list.
    #[must_use]
    pub fn from_events(events: &[SubmissionEvent]) -> Self {
        Self {
            total_votes: events.len() as u64,
            registered_votes: events.iter().filter(|e| e.is_registered).count() as u64,
        }
    }
}

/// Derived counters and running average for a rating-type entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingStats {
    /// Total number of rating events.
    pub total_ratings: u64,
    /// Number of ratings from registered users.
    pub registered_ratings: u64,
    /// Mean rating rounded to one decimal place; `0.0` with no events.
    pub average_rating: f64,
}

impl RatingStats {
    /// Computes rating counters and the rounded average from the full
    /// event list. Events without a rating value contribute to the
    /// counts but add zero to the sum; constructors never produce them
    /// for rating entities.
    #[must_use]
    pub fn from_events(events: &[SubmissionEvent]) -> Self {
        let total = events.len() as u64;
        let registered = events.iter().filter(|e| e.is_registered).count() as u64;
        let average = if total == 0 {
            0.0
        } else {
            let sum: u64 = events.iter().filter_map(|e| e.rating).map(u64::from).sum();
            ((sum as f64 / total as f64) * 10.0).round() / 10.0
        };
        Self {
            total_ratings: total,
            registered_ratings: registered,
            average_rating: average,
        }
    }
}
