//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::VotingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Voting service for all business logic.
    pub voting_service: Arc<VotingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
