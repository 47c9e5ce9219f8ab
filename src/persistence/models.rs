//! Database models for the submission event log and entity snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored event row from the `submission_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Prefixed entity key (`"fox:<n>"` / `"joke:<id>"`), empty for
    /// aggregate events such as leaderboard hints.
    pub entity_key: String,
    /// Event type discriminator (e.g. `"rating_update"`).
    pub event_type: String,
    /// JSONB payload with the full live event.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Which collection a snapshot row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// A fox entry with its full vote list.
    Fox,
    /// A joke entry with its full rating list.
    Joke,
    /// A user account with lifetime counters.
    User,
}

impl SnapshotKind {
    /// Returns the discriminator string stored in the `kind` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fox => "fox",
            Self::Joke => "joke",
            Self::User => "user",
        }
    }

    /// Parses the discriminator string from the `kind` column.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fox" => Some(Self::Fox),
            "joke" => Some(Self::Joke),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// An entity snapshot row from the `entity_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Which collection the entity belongs to.
    pub kind: SnapshotKind,
    /// Natural key within the collection (fox number, joke id, user id).
    pub entity_key: String,
    /// Full entity state as JSONB, including the event list.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_kind_round_trips() {
        for kind in [SnapshotKind::Fox, SnapshotKind::Joke, SnapshotKind::User] {
            assert_eq!(SnapshotKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SnapshotKind::parse("cat"), None);
    }
}
