//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` is the live-update channel: clients
//! subscribe to entities and receive stats updates and leaderboard
//! hints as submissions land.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
