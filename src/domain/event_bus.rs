//! Broadcast channel for live-update events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every
//! successful submission publishes [`LiveEvent`]s through the bus, and
//! all WebSocket connections subscribe to receive filtered events.
//! Delivery is fire-and-forget: no acknowledgement, no retry, and
//! lagging receivers drop the oldest events.

use tokio::sync::broadcast;

use super::LiveEvent;

/// Broadcast bus for [`LiveEvent`]s.
///
/// The set of current receivers is the live-subscriber registry:
/// process-local, grown on connect, shrunk on disconnect, and rebuilt
/// from nothing on restart.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LiveEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// With no active receivers the event is silently dropped.
    pub fn publish(&self, event: LiveEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    ///
    /// Each WebSocket connection calls this once on connect.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ids::{EntityKey, FoxNumber};
    use chrono::Utc;

    fn make_event(fox_number: FoxNumber) -> LiveEvent {
        LiveEvent::VoteUpdate {
            fox_number,
            total_votes: 1,
            registered_votes: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        let count = bus.publish(make_event(FoxNumber::new(1)));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let key = FoxNumber::new(42);
        bus.publish(make_event(key));

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected to receive event");
        };
        assert_eq!(event.entity_key(), Some(EntityKey::Fox(key)));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let count = bus.publish(make_event(FoxNumber::new(7)));
        assert_eq!(count, 2);

        let e1 = rx1.recv().await;
        let e2 = rx2.recv().await;
        let Ok(e1) = e1 else {
            panic!("rx1 failed");
        };
        let Ok(e2) = e2 else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.entity_key(), e2.entity_key());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let _rx1 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(_rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
