//! Persistence layer: PostgreSQL event log and entity snapshots.
//!
//! The in-memory registry is authoritative; this layer provides
//! durability. A background task appends every live event to the
//! `submission_events` log, a second task snapshots all entities on an
//! interval, and [`restore_registry`] replays the latest snapshots at
//! startup. Storage failures here are logged and never fail a request.

pub mod models;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::domain::{EntityRegistry, FoxEntry, JokeEntry, LiveEvent, UserAccount};
use crate::error::GatewayError;
use models::SnapshotKind;
use postgres::PostgresPersistence;

/// Restores the registry from the latest snapshot of every entity.
///
/// Rows that fail to deserialize are skipped with a warning so one
/// corrupt snapshot cannot block startup.
///
/// # Errors
///
/// Returns [`GatewayError::StorageUnavailable`] when the snapshot
/// query itself fails.
pub async fn restore_registry(
    persistence: &PostgresPersistence,
    registry: &EntityRegistry,
) -> Result<(), GatewayError> {
    let snapshots = persistence.load_latest_snapshots().await?;
    let mut restored = 0usize;

    for snapshot in snapshots {
        let ok = match snapshot.kind {
            SnapshotKind::Fox => match serde_json::from_value::<FoxEntry>(snapshot.state_json) {
                Ok(entry) => {
                    registry.restore_fox(entry).await;
                    true
                }
                Err(_) => false,
            },
            SnapshotKind::Joke => match serde_json::from_value::<JokeEntry>(snapshot.state_json) {
                Ok(entry) => {
                    registry.restore_joke(entry).await;
                    true
                }
                Err(_) => false,
            },
            SnapshotKind::User => {
                match serde_json::from_value::<UserAccount>(snapshot.state_json) {
                    Ok(account) => {
                        registry.restore_user(account).await;
                        true
                    }
                    Err(_) => false,
                }
            }
        };
        if ok {
            restored += 1;
        } else {
            tracing::warn!(
                kind = snapshot.kind.as_str(),
                entity_key = %snapshot.entity_key,
                "skipping unreadable snapshot"
            );
        }
    }

    tracing::info!(restored, "registry restored from snapshots");
    Ok(())
}

/// Event-log writer: appends every bus event to `submission_events`.
///
/// Runs until the bus closes. Storage failures are logged and the loop
/// keeps going — durability degrades, requests are unaffected.
pub async fn run_event_log(
    persistence: PostgresPersistence,
    mut events: broadcast::Receiver<LiveEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let key = event
                    .entity_key()
                    .map(|k| k.to_string())
                    .unwrap_or_default();
                let payload = serde_json::to_value(&event).unwrap_or_default();
                if let Err(e) = persistence
                    .save_event(&key, event.event_type_str(), &payload)
                    .await
                {
                    tracing::warn!(error = %e, "failed to append event to log");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "event log writer lagged behind bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Snapshot loop: periodically saves every entity's full state and
/// prunes snapshots older than `cleanup_after_days` (0 disables
/// cleanup).
pub async fn run_snapshot_loop(
    persistence: PostgresPersistence,
    registry: Arc<EntityRegistry>,
    interval: Duration,
    cleanup_after_days: u64,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        for entry in registry.snapshot_foxes().await {
            let key = entry.fox_number.to_string();
            let state = serde_json::to_value(&entry).unwrap_or_default();
            if let Err(e) = persistence
                .save_snapshot(SnapshotKind::Fox, &key, &state)
                .await
            {
                tracing::warn!(error = %e, "fox snapshot failed");
            }
        }
        for entry in registry.snapshot_jokes().await {
            let key = entry.joke_id.to_string();
            let state = serde_json::to_value(&entry).unwrap_or_default();
            if let Err(e) = persistence
                .save_snapshot(SnapshotKind::Joke, &key, &state)
                .await
            {
                tracing::warn!(error = %e, "joke snapshot failed");
            }
        }
        for account in registry.snapshot_users().await {
            let key = account.user_id.to_string();
            let state = serde_json::to_value(&account).unwrap_or_default();
            if let Err(e) = persistence
                .save_snapshot(SnapshotKind::User, &key, &state)
                .await
            {
                tracing::warn!(error = %e, "user snapshot failed");
            }
        }

        if cleanup_after_days > 0 {
            match persistence.delete_old_snapshots(cleanup_after_days).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "pruned old snapshots");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "snapshot cleanup failed"),
            }
        }
    }
}
