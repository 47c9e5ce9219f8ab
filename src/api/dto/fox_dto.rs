//! Fox-related DTOs for random pair, vote, and leaderboard operations.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{FoxSummary, VoteStats};

/// A fox card as served by pair, leaderboard, and popular endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FoxCard {
    /// Fox number from the upstream image URL.
    pub number: u32,
    /// Upstream image URL.
    pub image_url: String,
    /// Total vote count.
    pub total_votes: u64,
    /// Votes from registered users.
    pub registered_votes: u64,
}

impl From<FoxSummary> for FoxCard {
    fn from(summary: FoxSummary) -> Self {
        Self {
            number: summary.fox_number.get(),
            image_url: summary.image_url,
            total_votes: summary.total_votes,
            registered_votes: summary.registered_votes,
        }
    }
}

/// Response body for `GET /foxes/random-pair`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RandomPairResponse {
    /// First fox of the pair.
    pub fox1: FoxCard,
    /// Second fox of the pair, always a different fox number.
    pub fox2: FoxCard,
}

/// Response body for a successful vote submission.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct VoteResponse {
    /// Always `true` on success.
    pub success: bool,
    /// New total vote count.
    pub total_votes: u64,
    /// New registered vote count.
    pub registered_votes: u64,
}

impl From<VoteStats> for VoteResponse {
    fn from(stats: VoteStats) -> Self {
        Self {
            success: true,
            total_votes: stats.total_votes,
            registered_votes: stats.registered_votes,
        }
    }
}
