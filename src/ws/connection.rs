//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching subscription commands and forwarding filtered live
//! events. Dropping the connection drops its broadcast receiver,
//! which is all the cleanup the subscriber registry needs.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{EntityKey, LiveEvent};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the
///   client; lagging clients skip dropped events and reconcile by
///   re-querying the REST surface.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<LiveEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from the bus
            event = event_rx.recv() => {
                match event {
                    Ok(live_event) => {
                        if subs.matches(live_event.entity_key().as_ref()) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&live_event).unwrap_or_default(),
                            };
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        let err = WsMessage {
            id: String::new(),
            msg_type: WsMessageType::Error,
            timestamp: chrono::Utc::now(),
            payload: serde_json::json!({
                "code": 400,
                "message": "malformed JSON"
            }),
        };
        return serde_json::to_string(&err).ok();
    };

    if let Some(entity_keys) = msg.payload.get("entity_keys").and_then(|v| v.as_array()) {
        let command = msg
            .payload
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("subscribe");

        match command {
            "subscribe" => {
                let mut keys = Vec::new();
                let mut wildcard = false;
                for key_val in entity_keys {
                    if let Some(s) = key_val.as_str() {
                        if s == "*" {
                            wildcard = true;
                        } else if let Some(key) = EntityKey::parse(s) {
                            keys.push(key);
                        }
                    }
                }
                let subscribed: Vec<String> = keys.iter().map(ToString::to_string).collect();
                subs.subscribe(keys, wildcard);
                let response = WsMessage {
                    id: msg.id,
                    msg_type: WsMessageType::Response,
                    timestamp: chrono::Utc::now(),
                    payload: serde_json::json!({
                        "subscribed": subscribed,
                        "count": subs.count(),
                        "wildcard": subs.is_subscribed_all(),
                    }),
                };
                return serde_json::to_string(&response).ok();
            }
            "unsubscribe" => {
                let mut keys = Vec::new();
                for key_val in entity_keys {
                    if let Some(s) = key_val.as_str()
                        && let Some(key) = EntityKey::parse(s)
                    {
                        keys.push(key);
                    }
                }
                subs.unsubscribe(&keys);
                let response = WsMessage {
                    id: msg.id,
                    msg_type: WsMessageType::Response,
                    timestamp: chrono::Utc::now(),
                    payload: serde_json::json!({
                        "unsubscribed": keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "remaining_count": subs.count(),
                    }),
                };
                return serde_json::to_string(&response).ok();
            }
            _ => {}
        }
    }

    // Unknown command
    let err = WsMessage {
        id: msg.id,
        msg_type: WsMessageType::Error,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({
            "code": 404,
            "message": "unknown command"
        }),
    };
    serde_json::to_string(&err).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::FoxNumber;

    fn command(payload: serde_json::Value) -> String {
        let msg = WsMessage {
            id: "req-1".to_string(),
            msg_type: WsMessageType::Command,
            timestamp: chrono::Utc::now(),
            payload,
        };
        serde_json::to_string(&msg).unwrap_or_default()
    }

    #[test]
    fn subscribe_command_registers_keys() {
        let mut subs = SubscriptionManager::new();
        let text = command(serde_json::json!({
            "command": "subscribe",
            "entity_keys": ["fox:7", "joke:official_3"],
        }));

        let response = handle_text_message(&text, &mut subs);
        assert!(response.is_some());
        assert!(subs.matches(Some(&EntityKey::Fox(FoxNumber::new(7)))));
        assert_eq!(subs.count(), 2);
    }

    #[test]
    fn wildcard_subscription_via_star() {
        let mut subs = SubscriptionManager::new();
        let text = command(serde_json::json!({
            "command": "subscribe",
            "entity_keys": ["*"],
        }));

        let _ = handle_text_message(&text, &mut subs);
        assert!(subs.is_subscribed_all());
    }

    #[test]
    fn unsubscribe_command_removes_keys() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe(vec![EntityKey::Fox(FoxNumber::new(7))], false);

        let text = command(serde_json::json!({
            "command": "unsubscribe",
            "entity_keys": ["fox:7"],
        }));
        let _ = handle_text_message(&text, &mut subs);
        assert!(!subs.matches(Some(&EntityKey::Fox(FoxNumber::new(7)))));
    }

    #[test]
    fn malformed_json_yields_error_response() {
        let mut subs = SubscriptionManager::new();
        let response = handle_text_message("{not json", &mut subs);
        let Some(response) = response else {
            panic!("expected error response");
        };
        assert!(response.contains("malformed JSON"));
    }

    #[test]
    fn unknown_command_yields_error_response() {
        let mut subs = SubscriptionManager::new();
        let text = command(serde_json::json!({
            "command": "shout",
            "entity_keys": ["fox:1"],
        }));
        let response = handle_text_message(&text, &mut subs);
        let Some(response) = response else {
            panic!("expected error response");
        };
        assert!(response.contains("unknown command"));
    }
}
