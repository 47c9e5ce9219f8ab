//! Registered user accounts with lifetime submission counters.
//!
//! Credentials and token issuance live in the upstream auth service;
//! this model only carries what the voting core reads and mutates:
//! identity, profile basics, and the per-user vote/rating counters
//! bumped on every registered submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A registered user account. Created at registration, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique account identifier.
    pub user_id: UserId,
    /// Unique username (3–20 characters).
    pub username: String,
    /// Unique email address, stored lowercase.
    pub email: String,
    /// Lifetime count of votes submitted while logged in.
    pub total_votes: u64,
    /// Lifetime count of ratings submitted while logged in.
    pub total_ratings: u64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a fresh account with zeroed counters.
    #[must_use]
    pub fn new(username: String, email: String) -> Self {
        Self {
            user_id: UserId::new(),
            username,
            email: email.to_lowercase(),
            total_votes: 0,
            total_ratings: 0,
            created_at: Utc::now(),
        }
    }

    /// Bumps the lifetime vote counter.
    pub fn record_vote(&mut self) {
        self.total_votes = self.total_votes.saturating_add(1);
    }

    /// Bumps the lifetime rating counter.
    pub fn record_rating(&mut self) {
        self.total_ratings = self.total_ratings.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_has_zero_counters() {
        let user = UserAccount::new("reven".to_string(), "Rev@Example.COM".to_string());
        assert_eq!(user.total_votes, 0);
        assert_eq!(user.total_ratings, 0);
        assert_eq!(user.email, "rev@example.com");
    }

    #[test]
    fn counters_increment_independently() {
        let mut user = UserAccount::new("reven".to_string(), "rev@example.com".to_string());
        user.record_vote();
        user.record_vote();
        user.record_rating();
        assert_eq!(user.total_votes, 2);
        assert_eq!(user.total_ratings, 1);
    }
}
