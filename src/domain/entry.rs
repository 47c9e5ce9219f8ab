//! Entity aggregates: a fox or joke together with its event list and
//! derived stats, plus the lightweight summaries used by list endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{FoxNumber, JokeId, UserId};
use super::submission::{RatingStats, SubmissionEvent, VoteStats};

/// A fox in the voting collection.
///
/// Owns its vote events exclusively; the derived counters are
/// recomputed from the full list on every append, never incremented
/// independently, so `total_votes == votes.len()` holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoxEntry {
    /// Fox identifier (immutable after creation).
    pub fox_number: FoxNumber,
    /// Upstream image URL.
    pub image_url: String,
    /// Ordered vote events (insertion order = chronological).
    pub votes: Vec<SubmissionEvent>,
    /// Derived: total vote count.
    pub total_votes: u64,
    /// Derived: votes from registered users.
    pub registered_votes: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl FoxEntry {
    /// Creates a fox with no votes.
    #[must_use]
    pub fn new(fox_number: FoxNumber, image_url: String) -> Self {
        Self {
            fox_number,
            image_url,
            votes: Vec::new(),
            total_votes: 0,
            registered_votes: 0,
            created_at: Utc::now(),
        }
    }

    /// Appends one vote event and recomputes the derived counters from
    /// the complete list. Must be called under the entry's write lock.
    pub fn append_vote(&mut self, event: SubmissionEvent) -> VoteStats {
        self.votes.push(event);
        let stats = VoteStats::from_events(&self.votes);
        self.total_votes = stats.total_votes;
        self.registered_votes = stats.registered_votes;
        stats
    }

    /// Current derived counters.
    #[must_use]
    pub fn stats(&self) -> VoteStats {
        VoteStats {
            total_votes: self.total_votes,
            registered_votes: self.registered_votes,
        }
    }
}

/// A joke in the rating collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JokeEntry {
    /// Joke identifier (immutable after creation).
    pub joke_id: JokeId,
    /// Joke text (setup and punchline joined).
    pub text: String,
    /// Category label from the upstream source; defaults to `"general"`.
    pub category: String,
    /// Ordered rating events (insertion order = chronological).
    pub ratings: Vec<SubmissionEvent>,
    /// Derived: total rating count.
    pub total_ratings: u64,
    /// Derived: ratings from registered users.
    pub registered_ratings: u64,
    /// Derived: mean rating rounded to one decimal, `0.0` when unrated.
    pub average_rating: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl JokeEntry {
    /// Creates an unrated joke.
    #[must_use]
    pub fn new(joke_id: JokeId, text: String, category: String) -> Self {
        Self {
            joke_id,
            text,
            category,
            ratings: Vec::new(),
            total_ratings: 0,
            registered_ratings: 0,
            average_rating: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if the given user already has a rating event on
    /// this joke.
    #[must_use]
    pub fn has_rating_from(&self, user_id: UserId) -> bool {
        self.ratings.iter().any(|e| e.user_id == Some(user_id))
    }

    /// Appends one rating event and recomputes counters and average
    /// from the complete list. Must be called under the entry's write
    /// lock.
    pub fn append_rating(&mut self, event: SubmissionEvent) -> RatingStats {
        self.ratings.push(event);
        let stats = RatingStats::from_events(&self.ratings);
        self.total_ratings = stats.total_ratings;
        self.registered_ratings = stats.registered_ratings;
        self.average_rating = stats.average_rating;
        stats
    }

    /// Current derived stats.
    #[must_use]
    pub fn stats(&self) -> RatingStats {
        RatingStats {
            total_ratings: self.total_ratings,
            registered_ratings: self.registered_ratings,
            average_rating: self.average_rating,
        }
    }
}

/// Lightweight fox row for leaderboard endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct FoxSummary {
    /// Fox identifier.
    pub fox_number: FoxNumber,
    /// Upstream image URL.
    pub image_url: String,
    /// Total vote count.
    pub total_votes: u64,
    /// Votes from registered users.
    pub registered_votes: u64,
}

impl From<&FoxEntry> for FoxSummary {
    fn from(entry: &FoxEntry) -> Self {
        Self {
            fox_number: entry.fox_number,
            image_url: entry.image_url.clone(),
            total_votes: entry.total_votes,
            registered_votes: entry.registered_votes,
        }
    }
}

/// Lightweight joke row for top-rated endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct JokeSummary {
    /// Joke identifier.
    pub joke_id: JokeId,
    /// Joke text.
    pub text: String,
    /// Category label.
    pub category: String,
    /// Mean rating rounded to one decimal.
    pub average_rating: f64,
    /// Total rating count.
    pub total_ratings: u64,
}

impl From<&JokeEntry> for JokeSummary {
    fn from(entry: &JokeEntry) -> Self {
        Self {
            joke_id: entry.joke_id.clone(),
            text: entry.text.clone(),
            category: entry.category.clone(),
            average_rating: entry.average_rating,
            total_ratings: entry.total_ratings,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fox_counters_track_event_list() {
        let mut fox = FoxEntry::new(FoxNumber::new(7), FoxNumber::new(7).default_image_url());
        assert_eq!(fox.total_votes, 0);

        fox.append_vote(SubmissionEvent::vote(None));
        fox.append_vote(SubmissionEvent::vote(Some(UserId::new())));

        assert_eq!(fox.total_votes, fox.votes.len() as u64);
        assert_eq!(fox.total_votes, 2);
        assert_eq!(fox.registered_votes, 1);
    }

    #[test]
    fn joke_average_follows_appends() {
        let mut joke = JokeEntry::new(
            JokeId::new("official_1"),
            "Setup. Punchline.".to_string(),
            "general".to_string(),
        );
        let Ok(first) = SubmissionEvent::rating(None, 5) else {
            panic!("valid rating");
        };
        let Ok(second) = SubmissionEvent::rating(None, 4) else {
            panic!("valid rating");
        };
        joke.append_rating(first);
        let stats = joke.append_rating(second);

        assert_eq!(stats.total_ratings, 2);
        assert!((joke.average_rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn has_rating_from_finds_only_that_user() {
        let mut joke = JokeEntry::new(
            JokeId::new("official_2"),
            "text".to_string(),
            "general".to_string(),
        );
        let rater = UserId::new();
        let Ok(event) = SubmissionEvent::rating(Some(rater), 3) else {
            panic!("valid rating");
        };
        joke.append_rating(event);

        assert!(joke.has_rating_from(rater));
        assert!(!joke.has_rating_from(UserId::new()));
    }

    #[test]
    fn summaries_mirror_entry_fields() {
        let mut fox = FoxEntry::new(FoxNumber::new(3), "url".to_string());
        fox.append_vote(SubmissionEvent::vote(None));
        let summary = FoxSummary::from(&fox);
        assert_eq!(summary.fox_number, FoxNumber::new(3));
        assert_eq!(summary.total_votes, 1);
    }
}
