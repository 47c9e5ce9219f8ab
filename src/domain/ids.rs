//! Type-safe identifiers for foxes, jokes, and users.
//!
//! Foxes are keyed by the numeric suffix of their upstream image URL,
//! jokes by the string id of the upstream joke API (or a fallback id),
//! and users by a server-generated UUID v4. [`EntityKey`] unifies the
//! two ratable identifiers for event routing and WebSocket filtering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a fox, taken from its upstream image URL
/// (`https://randomfox.ca/images/<n>.jpg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoxNumber(u32);

impl FoxNumber {
    /// Wraps a raw fox number.
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the canonical upstream image URL for this fox.
    #[must_use]
    pub fn default_image_url(&self) -> String {
        format!("https://randomfox.ca/images/{}.jpg", self.0)
    }
}

impl fmt::Display for FoxNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FoxNumber {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// String identifier of a joke.
///
/// Jokes seeded from the upstream API use `official_<n>`; the static
/// fallback set uses `fallback_<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JokeId(String);

impl JokeId {
    /// Wraps a raw joke id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JokeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JokeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier of a registered user account.
///
/// Wraps a UUID v4 generated at registration time and immutable
/// thereafter. Referenced weakly by submission events; the entity owns
/// the event, the user is only pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(uuid::Uuid);

impl UserId {
    /// Creates a new random `UserId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `UserId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for UserId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

/// Key identifying either ratable collection's entry.
///
/// Used as the event discriminator on the bus and as the WebSocket
/// subscription target. Serialized as a prefixed string
/// (`"fox:1234"` / `"joke:official_17"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// A fox in the voting collection.
    Fox(FoxNumber),
    /// A joke in the rating collection.
    Joke(JokeId),
}

impl EntityKey {
    /// Parses a prefixed key string (`"fox:<n>"` or `"joke:<id>"`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(n) = s.strip_prefix("fox:") {
            return n.parse::<u32>().ok().map(|n| Self::Fox(FoxNumber::new(n)));
        }
        s.strip_prefix("joke:")
            .map(|id| Self::Joke(JokeId::new(id)))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fox(n) => write!(f, "fox:{n}"),
            Self::Joke(id) => write!(f, "joke:{id}"),
        }
    }
}

impl Serialize for EntityKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid entity key: {s}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn user_id_new_generates_unique_ids() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn fox_number_default_image_url() {
        let n = FoxNumber::new(71);
        assert_eq!(n.default_image_url(), "https://randomfox.ca/images/71.jpg");
    }

    #[test]
    fn entity_key_display_and_parse_round_trip() {
        let fox = EntityKey::Fox(FoxNumber::new(12));
        let joke = EntityKey::Joke(JokeId::new("official_42"));
        assert_eq!(EntityKey::parse(&fox.to_string()), Some(fox));
        assert_eq!(EntityKey::parse(&joke.to_string()), Some(joke));
    }

    #[test]
    fn entity_key_parse_rejects_garbage() {
        assert_eq!(EntityKey::parse("cat:abc"), None);
        assert_eq!(EntityKey::parse("fox:notanumber"), None);
        assert_eq!(EntityKey::parse(""), None);
    }

    #[test]
    fn joke_id_serde_round_trip() {
        let id = JokeId::new("fallback_3");
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"fallback_3\"");
        let back: JokeId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, back);
    }

    #[test]
    fn user_id_hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = UserId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
