//! Live-update events broadcast after successful submissions.
//!
//! Every accepted vote or rating publishes a per-entity stats event
//! plus a [`LiveEvent::LeaderboardHint`] through the
//! [`super::EventBus`]. Payloads are hints to re-render, not
//! transactional updates: subscribers reconcile by re-querying the
//! REST surface. Events are also appended to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{EntityKey, FoxNumber, JokeId};

/// Which leaderboard a [`LiveEvent::LeaderboardHint`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    /// Fox leaderboard ordered by registered votes.
    Foxes,
    /// Joke leaderboard ordered by average rating.
    Jokes,
}

/// Event emitted after every successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A fox received a vote.
    VoteUpdate {
        /// Fox that was voted for.
        fox_number: FoxNumber,
        /// New total vote count.
        total_votes: u64,
        /// New registered vote count.
        registered_votes: u64,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A joke received a rating.
    RatingUpdate {
        /// Joke that was rated.
        joke_id: JokeId,
        /// New mean rating rounded to one decimal.
        average_rating: f64,
        /// New total rating count.
        total_ratings: u64,
        /// New registered rating count.
        registered_ratings: u64,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A leaderboard's ordering may have changed; clients re-query.
    LeaderboardHint {
        /// Which leaderboard to refresh.
        leaderboard: LeaderboardKind,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LiveEvent {
    /// Returns the entity key this event refers to, if any.
    /// Leaderboard hints are aggregate events with no single entity.
    #[must_use]
    pub fn entity_key(&self) -> Option<EntityKey> {
        match self {
            Self::VoteUpdate { fox_number, .. } => Some(EntityKey::Fox(*fox_number)),
            Self::RatingUpdate { joke_id, .. } => Some(EntityKey::Joke(joke_id.clone())),
            Self::LeaderboardHint { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::VoteUpdate { .. } => "vote_update",
            Self::RatingUpdate { .. } => "rating_update",
            Self::LeaderboardHint { .. } => "leaderboard_hint",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn vote_update_event_type() {
        let event = LiveEvent::VoteUpdate {
            fox_number: FoxNumber::new(9),
            total_votes: 4,
            registered_votes: 1,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "vote_update");
        assert_eq!(event.entity_key(), Some(EntityKey::Fox(FoxNumber::new(9))));
    }

    #[test]
    fn rating_update_serializes_with_tag() {
        let event = LiveEvent::RatingUpdate {
            joke_id: JokeId::new("official_5"),
            average_rating: 4.3,
            total_ratings: 12,
            registered_ratings: 7,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("rating_update"));
        assert!(json_str.contains("official_5"));
        assert!(json_str.contains("4.3"));
    }

    #[test]
    fn leaderboard_hint_has_no_entity_key() {
        let event = LiveEvent::LeaderboardHint {
            leaderboard: LeaderboardKind::Foxes,
            timestamp: Utc::now(),
        };
        assert_eq!(event.entity_key(), None);
        assert_eq!(event.event_type_str(), "leaderboard_hint");
    }
}
