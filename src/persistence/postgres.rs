//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{EntitySnapshot, SnapshotKind, StoredEvent};
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
///
/// Durability only: the in-memory registry stays authoritative for
/// live counters, this layer records the event log and periodic
/// snapshots and feeds the restore at startup.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an event to the submission event log.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StorageUnavailable`] on database failure.
    pub async fn save_event(
        &self,
        entity_key: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO submission_events (entity_key, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(entity_key)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StorageUnavailable(e.to_string()))?;

        Ok(row)
    }

    /// Saves one entity state snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StorageUnavailable`] on database failure.
    pub async fn save_snapshot(
        &self,
        kind: SnapshotKind,
        entity_key: &str,
        state_json: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO entity_snapshots (kind, entity_key, state_json) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(kind.as_str())
        .bind(entity_key)
        .bind(state_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StorageUnavailable(e.to_string()))?;

        Ok(row)
    }

    /// Loads the latest snapshot for each entity using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StorageUnavailable`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<EntitySnapshot>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (kind, entity_key) id, kind, entity_key, state_json, snapshot_at \
             FROM entity_snapshots ORDER BY kind, entity_key, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::StorageUnavailable(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, kind, entity_key, state_json, snapshot_at)| {
                let kind = SnapshotKind::parse(&kind)?;
                Some(EntitySnapshot {
                    id,
                    kind,
                    entity_key,
                    state_json,
                    snapshot_at,
                })
            })
            .collect())
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// entity key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StorageUnavailable`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        entity_key: Option<&str>,
    ) -> Result<Vec<StoredEvent>, GatewayError> {
        let rows = if let Some(key) = entity_key {
            sqlx::query_as::<_, (i64, String, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, entity_key, event_type, payload, created_at FROM submission_events \
                 WHERE created_at > $1 AND entity_key = $2 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(key)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, String, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, entity_key, event_type, payload, created_at FROM submission_events \
                 WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| GatewayError::StorageUnavailable(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, entity_key, event_type, payload, created_at)| StoredEvent {
                    id,
                    entity_key,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StorageUnavailable`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, GatewayError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM entity_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StorageUnavailable(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
