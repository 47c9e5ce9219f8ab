//! Domain layer: core types, entity registry, and event system.
//!
//! This module contains the server-side domain model: fox/joke/user
//! identity, submission events with their pure stats aggregators, the
//! entity registry for concurrent storage, and the event bus for
//! broadcasting live updates.

pub mod entry;
pub mod event_bus;
pub mod ids;
pub mod live_event;
pub mod registry;
pub mod submission;
pub mod user;

pub use entry::{FoxEntry, FoxSummary, JokeEntry, JokeSummary};
pub use event_bus::EventBus;
pub use ids::{EntityKey, FoxNumber, JokeId, UserId};
pub use live_event::{LeaderboardKind, LiveEvent};
pub use registry::EntityRegistry;
pub use submission::{MAX_RATING, MIN_RATING, RatingStats, SubmissionEvent, VoteStats};
pub use user::UserAccount;
