//! Per-connection subscription manager.
//!
//! Tracks which entities a WebSocket client is subscribed to and
//! provides server-side event filtering. Leaderboard hints carry no
//! entity key and always pass the filter — every connected client is
//! told to refresh.

use std::collections::HashSet;

use crate::domain::EntityKey;

/// Manages the set of entity subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed entity keys. Ignored while `subscribe_all` is true.
    keys: HashSet<EntityKey>,
    /// Whether the client subscribes to all entities (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds entity keys to the subscription set. `wildcard` enables
    /// the catch-all subscription.
    pub fn subscribe(&mut self, keys: Vec<EntityKey>, wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for key in keys {
            self.keys.insert(key);
        }
    }

    /// Removes entity keys from the subscription set.
    pub fn unsubscribe(&mut self, keys: &[EntityKey]) {
        for key in keys {
            self.keys.remove(key);
        }
    }

    /// Returns `true` if an event with the given key should be
    /// forwarded. Aggregate events (`None`) always match.
    #[must_use]
    pub fn matches(&self, key: Option<&EntityKey>) -> bool {
        match key {
            None => true,
            Some(key) => self.subscribe_all || self.keys.contains(key),
        }
    }

    /// Returns the number of explicitly subscribed entity keys.
    #[must_use]
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FoxNumber, JokeId};

    fn fox(n: u32) -> EntityKey {
        EntityKey::Fox(FoxNumber::new(n))
    }

    #[test]
    fn empty_matches_only_aggregate_events() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(Some(&fox(1))));
        assert!(mgr.matches(None));
    }

    #[test]
    fn subscribe_specific_entity() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(vec![fox(1)], false);
        assert!(mgr.matches(Some(&fox(1))));
        assert!(!mgr.matches(Some(&fox(2))));
        assert!(!mgr.matches(Some(&EntityKey::Joke(JokeId::new("official_1")))));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(Vec::new(), true);
        assert!(mgr.matches(Some(&fox(1))));
        assert!(mgr.matches(Some(&EntityKey::Joke(JokeId::new("official_9")))));
        assert!(mgr.is_subscribed_all());
    }

    #[test]
    fn unsubscribe_removes_entity() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(vec![fox(3)], false);
        assert!(mgr.matches(Some(&fox(3))));
        mgr.unsubscribe(&[fox(3)]);
        assert!(!mgr.matches(Some(&fox(3))));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(vec![fox(1), fox(2)], false);
        assert_eq!(mgr.count(), 2);
    }
}
