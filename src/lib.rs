//! # foxvote-gateway
//!
//! REST API and WebSocket gateway for the fox voting and joke rating
//! service.
//!
//! This crate provides the submission pipeline (votes and ratings with
//! derived stats), the read-only query surface behind leaderboards,
//! and the live-update channel that pushes stats changes to connected
//! browsers. Authentication token issuance and template rendering live
//! in upstream collaborators.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── VotingService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── EntityRegistry (domain/)
//!     ├── SeedClient (upstream/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod upstream;
pub mod ws;
