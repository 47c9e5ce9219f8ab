//! Service layer: business logic orchestration.
//!
//! [`VotingService`] coordinates submissions and queries over the
//! entity registry and emits live events through the
//! [`crate::domain::EventBus`].

pub mod voting_service;

pub use voting_service::{DEFAULT_LEADERBOARD_LIMIT, DEFAULT_TOP_RATED_LIMIT, VotingService};
