//! Concurrent entity storage with per-entry fine-grained locking.
//!
//! [`EntityRegistry`] is the authoritative store for foxes, jokes, and
//! users. Each collection is a `RwLock<HashMap<..>>` whose values are
//! individually protected by a [`tokio::sync::RwLock`]. The per-entry
//! write lock is the linearization point for submissions: append,
//! recompute, and store happen inside one critical section, so two
//! concurrent submissions against the same entity can never act on a
//! stale snapshot and an increment can never be lost.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::entry::{FoxEntry, FoxSummary, JokeEntry, JokeSummary};
use super::ids::{FoxNumber, JokeId, UserId};
use super::user::UserAccount;
use crate::error::GatewayError;

/// Central store for foxes, jokes, and user accounts.
///
/// # Concurrency
///
/// - Multiple tasks may read the same entry concurrently.
/// - Writes to different entries proceed in parallel.
/// - Writes to the same entry are serialized by its own lock.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    foxes: RwLock<HashMap<FoxNumber, Arc<RwLock<FoxEntry>>>>,
    jokes: RwLock<HashMap<JokeId, Arc<RwLock<JokeEntry>>>>,
    users: RwLock<HashMap<UserId, Arc<RwLock<UserAccount>>>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fox entry, creating it with the default upstream
    /// image URL when absent. Votes against unseen foxes upsert rather
    /// than fail (observed product behavior; ratings do the opposite).
    pub async fn fox_or_insert(
        &self,
        fox_number: FoxNumber,
        image_url: Option<String>,
    ) -> Arc<RwLock<FoxEntry>> {
        let mut map = self.foxes.write().await;
        Arc::clone(map.entry(fox_number).or_insert_with(|| {
            let url = image_url.unwrap_or_else(|| fox_number.default_image_url());
            Arc::new(RwLock::new(FoxEntry::new(fox_number, url)))
        }))
    }

    /// Returns the joke entry behind its per-entry lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::JokeNotFound`] when no joke with the
    /// given id exists. Ratings never upsert.
    pub async fn joke(&self, joke_id: &JokeId) -> Result<Arc<RwLock<JokeEntry>>, GatewayError> {
        let map = self.jokes.read().await;
        map.get(joke_id)
            .map(Arc::clone)
            .ok_or_else(|| GatewayError::JokeNotFound(joke_id.clone()))
    }

    /// Inserts the joke if its id is unseen, otherwise keeps the
    /// existing entry (and its accumulated ratings). Returns the entry
    /// either way. Used when seeding from the upstream joke source.
    pub async fn joke_or_insert(&self, entry: JokeEntry) -> Arc<RwLock<JokeEntry>> {
        let mut map = self.jokes.write().await;
        Arc::clone(
            map.entry(entry.joke_id.clone())
                .or_insert_with(|| Arc::new(RwLock::new(entry))),
        )
    }

    /// Inserts or replaces a fox wholesale. Used when restoring
    /// snapshots at startup.
    pub async fn restore_fox(&self, entry: FoxEntry) {
        let mut map = self.foxes.write().await;
        map.insert(entry.fox_number, Arc::new(RwLock::new(entry)));
    }

    /// Inserts or replaces a joke wholesale. Used when restoring
    /// snapshots at startup.
    pub async fn restore_joke(&self, entry: JokeEntry) {
        let mut map = self.jokes.write().await;
        map.insert(entry.joke_id.clone(), Arc::new(RwLock::new(entry)));
    }

    /// Registers a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the username or
    /// email is already taken.
    pub async fn insert_user(&self, account: UserAccount) -> Result<UserId, GatewayError> {
        let mut map = self.users.write().await;
        for existing_lock in map.values() {
            let existing = existing_lock.read().await;
            if existing.username == account.username {
                return Err(GatewayError::InvalidRequest(format!(
                    "username {} already taken",
                    account.username
                )));
            }
            if existing.email == account.email {
                return Err(GatewayError::InvalidRequest(format!(
                    "email {} already registered",
                    account.email
                )));
            }
        }
        let user_id = account.user_id;
        map.insert(user_id, Arc::new(RwLock::new(account)));
        Ok(user_id)
    }

    /// Returns the user account behind its per-entry lock, or `None`
    /// for unknown ids. Unknown authenticated ids are treated as
    /// anonymous submitters, never rejected.
    pub async fn user(&self, user_id: UserId) -> Option<Arc<RwLock<UserAccount>>> {
        let map = self.users.read().await;
        map.get(&user_id).map(Arc::clone)
    }

    /// Inserts or replaces a user wholesale. Used when restoring
    /// snapshots at startup.
    pub async fn restore_user(&self, account: UserAccount) {
        let mut map = self.users.write().await;
        map.insert(account.user_id, Arc::new(RwLock::new(account)));
    }

    /// Returns summaries of all foxes.
    pub async fn list_foxes(&self) -> Vec<FoxSummary> {
        let map = self.foxes.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(FoxSummary::from(&*entry));
        }
        summaries
    }

    /// Returns summaries of all jokes.
    pub async fn list_jokes(&self) -> Vec<JokeSummary> {
        let map = self.jokes.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(JokeSummary::from(&*entry));
        }
        summaries
    }

    /// Returns full clones of all fox entries for snapshotting.
    pub async fn snapshot_foxes(&self) -> Vec<FoxEntry> {
        let map = self.foxes.read().await;
        let mut entries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            entries.push(entry_lock.read().await.clone());
        }
        entries
    }

    /// Returns full clones of all joke entries for snapshotting.
    pub async fn snapshot_jokes(&self) -> Vec<JokeEntry> {
        let map = self.jokes.read().await;
        let mut entries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            entries.push(entry_lock.read().await.clone());
        }
        entries
    }

    /// Returns full clones of all user accounts for snapshotting.
    pub async fn snapshot_users(&self) -> Vec<UserAccount> {
        let map = self.users.read().await;
        let mut accounts = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            accounts.push(entry_lock.read().await.clone());
        }
        accounts
    }

    /// Returns the number of foxes in the registry.
    pub async fn fox_count(&self) -> usize {
        self.foxes.read().await.len()
    }

    /// Returns the number of jokes in the registry.
    pub async fn joke_count(&self) -> usize {
        self.jokes.read().await.len()
    }

    /// Returns the number of registered users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fox_or_insert_creates_with_default_url() {
        let registry = EntityRegistry::new();
        let fox_lock = registry.fox_or_insert(FoxNumber::new(5), None).await;
        let fox = fox_lock.read().await;
        assert_eq!(fox.image_url, "https://randomfox.ca/images/5.jpg");
        assert_eq!(fox.total_votes, 0);
    }

    #[tokio::test]
    async fn fox_or_insert_returns_existing_entry() {
        let registry = EntityRegistry::new();
        let first = registry
            .fox_or_insert(FoxNumber::new(5), Some("custom".to_string()))
            .await;
        first.write().await.total_votes = 3;

        let second = registry.fox_or_insert(FoxNumber::new(5), None).await;
        assert_eq!(second.read().await.total_votes, 3);
        assert_eq!(second.read().await.image_url, "custom");
    }

    #[tokio::test]
    async fn missing_joke_is_not_found() {
        let registry = EntityRegistry::new();
        let result = registry.joke(&JokeId::new("official_404")).await;
        assert!(matches!(result, Err(GatewayError::JokeNotFound(_))));
    }

    #[tokio::test]
    async fn joke_or_insert_keeps_existing_ratings() {
        let registry = EntityRegistry::new();
        let joke = JokeEntry::new(
            JokeId::new("official_1"),
            "first".to_string(),
            "general".to_string(),
        );
        let lock = registry.joke_or_insert(joke).await;
        lock.write().await.total_ratings = 9;

        let again = JokeEntry::new(
            JokeId::new("official_1"),
            "should be ignored".to_string(),
            "general".to_string(),
        );
        let lock = registry.joke_or_insert(again).await;
        let entry = lock.read().await;
        assert_eq!(entry.text, "first");
        assert_eq!(entry.total_ratings, 9);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let registry = EntityRegistry::new();
        let first = UserAccount::new("reven".to_string(), "a@example.com".to_string());
        assert!(registry.insert_user(first).await.is_ok());

        let dup_name = UserAccount::new("reven".to_string(), "b@example.com".to_string());
        assert!(registry.insert_user(dup_name).await.is_err());

        let dup_mail = UserAccount::new("other".to_string(), "a@example.com".to_string());
        assert!(registry.insert_user(dup_mail).await.is_err());
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let registry = EntityRegistry::new();
        assert!(registry.user(UserId::new()).await.is_none());
    }

    #[tokio::test]
    async fn counts_track_collections() {
        let registry = EntityRegistry::new();
        assert_eq!(registry.fox_count().await, 0);

        let _ = registry.fox_or_insert(FoxNumber::new(1), None).await;
        let _ = registry.fox_or_insert(FoxNumber::new(2), None).await;
        let _ = registry
            .joke_or_insert(JokeEntry::new(
                JokeId::new("j"),
                "t".to_string(),
                "general".to_string(),
            ))
            .await;

        assert_eq!(registry.fox_count().await, 2);
        assert_eq!(registry.joke_count().await, 1);
        assert_eq!(registry.user_count().await, 0);
    }

    #[tokio::test]
    async fn restore_replaces_entry() {
        let registry = EntityRegistry::new();
        let mut fox = FoxEntry::new(FoxNumber::new(8), "url".to_string());
        fox.total_votes = 12;
        registry.restore_fox(fox).await;

        let lock = registry.fox_or_insert(FoxNumber::new(8), None).await;
        assert_eq!(lock.read().await.total_votes, 12);
    }
}
