//! Voting service: orchestrates submissions, queries, and event emission.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    EntityRegistry, EventBus, FoxNumber, FoxSummary, JokeEntry, JokeId, JokeSummary,
    LeaderboardKind, LiveEvent, RatingStats, SubmissionEvent, UserAccount, UserId, VoteStats,
};
use crate::error::GatewayError;
use crate::upstream::{SeedSource, fallback_fox_pair, fallback_jokes};

/// Maximum attempts to draw a second, distinct fox for a random pair
/// before falling back to static content.
const MAX_PAIR_ATTEMPTS: usize = 10;

/// Default limit for leaderboard queries.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

/// Default limit for top-rated joke queries.
pub const DEFAULT_TOP_RATED_LIMIT: usize = 10;

/// Orchestration layer for all voting and rating operations.
///
/// Stateless coordinator: owns references to [`EntityRegistry`] for
/// state, [`EventBus`] for notification fan-out, and a [`SeedSource`]
/// for upstream content. Every submission follows the pattern:
/// validate → acquire the entry's write lock → append event and
/// recompute stats in that critical section → bump the submitter's
/// lifetime counter → publish live events → return fresh stats.
#[derive(Debug, Clone)]
pub struct VotingService {
    registry: Arc<EntityRegistry>,
    event_bus: EventBus,
    seed: Arc<dyn SeedSource>,
}

impl VotingService {
    /// Creates a new `VotingService`.
    #[must_use]
    pub fn new(registry: Arc<EntityRegistry>, event_bus: EventBus, seed: Arc<dyn SeedSource>) -> Self {
        Self {
            registry,
            event_bus,
            seed,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`EntityRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Resolves an authenticated id to a registered account. Unknown
    /// ids degrade to anonymous, mirroring the auth middleware which
    /// nulls the user on any token failure.
    async fn resolve_submitter(&self, submitter: Option<UserId>) -> Option<UserId> {
        match submitter {
            Some(id) => self.registry.user(id).await.map(|_| id),
            None => None,
        }
    }

    /// Records one vote for a fox, creating the fox when unseen.
    ///
    /// Votes have no duplicate check — only ratings enforce
    /// one-submission-per-registered-user (observed product gap,
    /// deliberately not unified).
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; the `Result` reserves the
    /// storage failure path for callers.
    pub async fn submit_vote(
        &self,
        fox_number: FoxNumber,
        submitter: Option<UserId>,
    ) -> Result<VoteStats, GatewayError> {
        let submitter = self.resolve_submitter(submitter).await;

        let fox_lock = self.registry.fox_or_insert(fox_number, None).await;
        let stats = {
            let mut fox = fox_lock.write().await;
            fox.append_vote(SubmissionEvent::vote(submitter))
        };

        if let Some(user_id) = submitter
            && let Some(user_lock) = self.registry.user(user_id).await
        {
            user_lock.write().await.record_vote();
        }

        let _ = self.event_bus.publish(LiveEvent::VoteUpdate {
            fox_number,
            total_votes: stats.total_votes,
            registered_votes: stats.registered_votes,
            timestamp: Utc::now(),
        });
        let _ = self.event_bus.publish(LiveEvent::LeaderboardHint {
            leaderboard: LeaderboardKind::Foxes,
            timestamp: Utc::now(),
        });

        tracing::info!(%fox_number, total_votes = stats.total_votes, "vote recorded");
        Ok(stats)
    }

    /// Records one rating for a joke.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRating`] when `value` is outside `1..=5`;
    ///   no state is touched.
    /// - [`GatewayError::JokeNotFound`] when the joke id is unknown.
    /// - [`GatewayError::DuplicateRating`] when the registered submitter
    ///   already rated this joke; stats reflect only the first rating.
    pub async fn rate_joke(
        &self,
        joke_id: &JokeId,
        submitter: Option<UserId>,
        value: u8,
    ) -> Result<RatingStats, GatewayError> {
        let submitter = self.resolve_submitter(submitter).await;
        // Validate before any storage access so a rejected value leaves
        // no trace.
        let event = SubmissionEvent::rating(submitter, value)?;

        let joke_lock = self.registry.joke(joke_id).await?;
        let stats = {
            let mut joke = joke_lock.write().await;
            if let Some(user_id) = submitter
                && joke.has_rating_from(user_id)
            {
                return Err(GatewayError::DuplicateRating(joke_id.clone()));
            }
            joke.append_rating(event)
        };

        if let Some(user_id) = submitter
            && let Some(user_lock) = self.registry.user(user_id).await
        {
            user_lock.write().await.record_rating();
        }

        let _ = self.event_bus.publish(LiveEvent::RatingUpdate {
            joke_id: joke_id.clone(),
            average_rating: stats.average_rating,
            total_ratings: stats.total_ratings,
            registered_ratings: stats.registered_ratings,
            timestamp: Utc::now(),
        });
        let _ = self.event_bus.publish(LiveEvent::LeaderboardHint {
            leaderboard: LeaderboardKind::Jokes,
            timestamp: Utc::now(),
        });

        tracing::info!(%joke_id, average = stats.average_rating, "rating recorded");
        Ok(stats)
    }

    /// Returns a random joke, seeding it into the registry when unseen.
    ///
    /// On upstream timeout a static fallback joke is served instead —
    /// the failure is logged, never surfaced.
    pub async fn random_joke(&self) -> JokeSummary {
        let seed = match self.seed.random_joke().await {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!(error = %e, "joke source unavailable, serving fallback");
                let jokes = fallback_jokes();
                let pick = rand::random_range(0..jokes.len());
                jokes.into_iter().nth(pick).unwrap_or_else(fallback_joke_zero)
            }
        };

        let entry_lock = self
            .registry
            .joke_or_insert(JokeEntry::new(seed.joke_id, seed.text, seed.category))
            .await;
        let entry = entry_lock.read().await;
        JokeSummary::from(&*entry)
    }

    /// Returns two distinct random foxes, seeding both into the
    /// registry. Retries the source on identifier collision up to
    /// [`MAX_PAIR_ATTEMPTS`] times; on exhaustion or upstream timeout
    /// the static fallback pair is served.
    pub async fn random_fox_pair(&self) -> (FoxSummary, FoxSummary) {
        let (first, second) = match self.draw_distinct_pair().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "fox source unavailable, serving fallback pair");
                fallback_fox_pair()
            }
        };

        let first_lock = self
            .registry
            .fox_or_insert(first.fox_number, Some(first.image_url))
            .await;
        let second_lock = self
            .registry
            .fox_or_insert(second.fox_number, Some(second.image_url))
            .await;

        let first = FoxSummary::from(&*first_lock.read().await);
        let second = FoxSummary::from(&*second_lock.read().await);
        (first, second)
    }

    async fn draw_distinct_pair(
        &self,
    ) -> Result<(crate::upstream::FoxSeed, crate::upstream::FoxSeed), GatewayError> {
        let first = self.seed.random_fox().await?;
        for _ in 0..MAX_PAIR_ATTEMPTS {
            let second = self.seed.random_fox().await?;
            if second.fox_number != first.fox_number {
                return Ok((first, second));
            }
        }
        Err(GatewayError::UpstreamTimeout(format!(
            "no distinct fox after {MAX_PAIR_ATTEMPTS} attempts"
        )))
    }

    /// Top jokes ordered by (average rating desc, total ratings desc),
    /// restricted to jokes with at least one rating.
    pub async fn top_rated_jokes(&self, limit: usize) -> Vec<JokeSummary> {
        let mut jokes: Vec<_> = self
            .registry
            .list_jokes()
            .await
            .into_iter()
            .filter(|j| j.total_ratings > 0)
            .collect();
        jokes.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then(b.total_ratings.cmp(&a.total_ratings))
        });
        jokes.truncate(limit);
        jokes
    }

    /// Fox leaderboard ordered by registered votes descending,
    /// restricted to foxes with at least one registered vote.
    pub async fn fox_leaderboard(&self, limit: usize) -> Vec<FoxSummary> {
        let mut foxes: Vec<_> = self
            .registry
            .list_foxes()
            .await
            .into_iter()
            .filter(|f| f.registered_votes > 0)
            .collect();
        foxes.sort_by(|a, b| b.registered_votes.cmp(&a.registered_votes));
        foxes.truncate(limit);
        foxes
    }

    /// Foxes ordered by total votes descending.
    pub async fn top_voted_foxes(&self, limit: usize) -> Vec<FoxSummary> {
        let mut foxes: Vec<_> = self
            .registry
            .list_foxes()
            .await
            .into_iter()
            .filter(|f| f.total_votes > 0)
            .collect();
        foxes.sort_by(|a, b| b.total_votes.cmp(&a.total_votes));
        foxes.truncate(limit);
        foxes
    }

    /// The single fox with the highest total vote count, or `None`
    /// when no fox has any votes.
    pub async fn most_popular_fox(&self) -> Option<FoxSummary> {
        self.registry
            .list_foxes()
            .await
            .into_iter()
            .filter(|f| f.total_votes > 0)
            .max_by_key(|f| f.total_votes)
    }

    /// Registers a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on malformed input or a
    /// duplicate username/email.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
    ) -> Result<UserAccount, GatewayError> {
        let username = username.trim();
        if username.len() < 3 || username.len() > 20 {
            return Err(GatewayError::InvalidRequest(
                "username must be 3-20 characters".to_string(),
            ));
        }
        let email = email.trim();
        if !email.contains('@') {
            return Err(GatewayError::InvalidRequest(
                "invalid email address".to_string(),
            ));
        }

        let account = UserAccount::new(username.to_string(), email.to_string());
        let user_id = self.registry.insert_user(account).await?;
        let account_lock = self
            .registry
            .user(user_id)
            .await
            .ok_or_else(|| GatewayError::Internal("freshly inserted user missing".to_string()))?;
        let account = account_lock.read().await.clone();
        Ok(account)
    }

    /// Fetches a user's profile with lifetime counters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for unknown ids.
    pub async fn user_profile(&self, user_id: UserId) -> Result<UserAccount, GatewayError> {
        let account_lock = self
            .registry
            .user(user_id)
            .await
            .ok_or(GatewayError::UserNotFound(user_id))?;
        let account = account_lock.read().await.clone();
        Ok(account)
    }
}

/// First fallback joke, used when the fallback set is somehow empty.
fn fallback_joke_zero() -> crate::upstream::JokeSeed {
    crate::upstream::JokeSeed {
        joke_id: JokeId::new("fallback_1"),
        text: "Why don't scientists trust atoms? Because they make up everything!".to_string(),
        category: "science".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::upstream::{FoxSeed, JokeSeed};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Seed source that cycles through scripted fox numbers and serves
    /// one fixed joke. `fail: true` simulates an unreachable upstream.
    #[derive(Debug, Default)]
    struct ScriptedSeed {
        fox_numbers: Vec<u32>,
        cursor: AtomicUsize,
        fail: bool,
    }

    impl ScriptedSeed {
        fn with_foxes(fox_numbers: Vec<u32>) -> Self {
            Self {
                fox_numbers,
                cursor: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SeedSource for ScriptedSeed {
        async fn random_fox(&self) -> Result<FoxSeed, GatewayError> {
            if self.fail {
                return Err(GatewayError::UpstreamTimeout("scripted failure".to_string()));
            }
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            let n = self
                .fox_numbers
                .get(i % self.fox_numbers.len().max(1))
                .copied()
                .unwrap_or(1);
            Ok(FoxSeed {
                fox_number: FoxNumber::new(n),
                image_url: FoxNumber::new(n).default_image_url(),
            })
        }

        async fn random_joke(&self) -> Result<JokeSeed, GatewayError> {
            if self.fail {
                return Err(GatewayError::UpstreamTimeout("scripted failure".to_string()));
            }
            Ok(JokeSeed {
                joke_id: JokeId::new("official_1"),
                text: "Setup. Punchline.".to_string(),
                category: "general".to_string(),
            })
        }
    }

    fn service_with(seed: ScriptedSeed) -> VotingService {
        VotingService::new(
            Arc::new(EntityRegistry::new()),
            EventBus::new(64),
            Arc::new(seed),
        )
    }

    async fn seeded_joke(service: &VotingService) -> JokeId {
        let lock = service
            .registry()
            .joke_or_insert(JokeEntry::new(
                JokeId::new("official_1"),
                "Setup. Punchline.".to_string(),
                "general".to_string(),
            ))
            .await;
        lock.read().await.joke_id.clone()
    }

    #[tokio::test]
    async fn vote_creates_missing_fox_and_counts() {
        let service = service_with(ScriptedSeed::default());
        let stats = service.submit_vote(FoxNumber::new(9), None).await;
        let Ok(stats) = stats else {
            panic!("vote failed");
        };
        assert_eq!(stats.total_votes, 1);
        assert_eq!(stats.registered_votes, 0);
        assert_eq!(service.registry().fox_count().await, 1);
    }

    #[tokio::test]
    async fn registered_vote_bumps_user_counter() {
        let service = service_with(ScriptedSeed::default());
        let Ok(user) = service.register_user("reven", "rev@example.com").await else {
            panic!("registration failed");
        };

        let _ = service.submit_vote(FoxNumber::new(1), Some(user.user_id)).await;
        let _ = service.submit_vote(FoxNumber::new(2), Some(user.user_id)).await;

        let Ok(profile) = service.user_profile(user.user_id).await else {
            panic!("profile lookup failed");
        };
        assert_eq!(profile.total_votes, 2);
    }

    #[tokio::test]
    async fn unknown_submitter_counts_as_anonymous() {
        let service = service_with(ScriptedSeed::default());
        let stats = service
            .submit_vote(FoxNumber::new(5), Some(UserId::new()))
            .await;
        let Ok(stats) = stats else {
            panic!("vote failed");
        };
        assert_eq!(stats.total_votes, 1);
        assert_eq!(stats.registered_votes, 0);
    }

    #[tokio::test]
    async fn out_of_range_rating_leaves_no_trace() {
        let service = service_with(ScriptedSeed::default());
        let joke_id = seeded_joke(&service).await;

        for bad in [0u8, 6] {
            let result = service.rate_joke(&joke_id, None, bad).await;
            assert!(matches!(result, Err(GatewayError::InvalidRating(_))));
        }

        let Ok(lock) = service.registry().joke(&joke_id).await else {
            panic!("joke missing");
        };
        assert_eq!(lock.read().await.total_ratings, 0);
    }

    #[tokio::test]
    async fn rating_missing_joke_is_not_found() {
        let service = service_with(ScriptedSeed::default());
        let result = service
            .rate_joke(&JokeId::new("official_404"), None, 3)
            .await;
        assert!(matches!(result, Err(GatewayError::JokeNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_rating_rejected_stats_keep_first() {
        let service = service_with(ScriptedSeed::default());
        let joke_id = seeded_joke(&service).await;
        let Ok(user) = service.register_user("reven", "rev@example.com").await else {
            panic!("registration failed");
        };

        let first = service.rate_joke(&joke_id, Some(user.user_id), 5).await;
        assert!(first.is_ok());

        let second = service.rate_joke(&joke_id, Some(user.user_id), 1).await;
        assert!(matches!(second, Err(GatewayError::DuplicateRating(_))));

        let Ok(lock) = service.registry().joke(&joke_id).await else {
            panic!("joke missing");
        };
        let joke = lock.read().await;
        assert_eq!(joke.total_ratings, 1);
        assert!((joke.average_rating - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn anonymous_may_rate_repeatedly() {
        let service = service_with(ScriptedSeed::default());
        let joke_id = seeded_joke(&service).await;

        assert!(service.rate_joke(&joke_id, None, 4).await.is_ok());
        assert!(service.rate_joke(&joke_id, None, 2).await.is_ok());

        let Ok(lock) = service.registry().joke(&joke_id).await else {
            panic!("joke missing");
        };
        assert_eq!(lock.read().await.total_ratings, 2);
    }

    #[tokio::test]
    async fn concurrent_votes_never_lose_an_update() {
        let service = Arc::new(service_with(ScriptedSeed::default()));
        let fox = FoxNumber::new(77);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let svc = Arc::clone(&service);
            handles.push(tokio::spawn(
                async move { svc.submit_vote(fox, None).await },
            ));
        }
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("task panicked");
            };
            assert!(result.is_ok());
        }

        let fox_lock = service.registry().fox_or_insert(fox, None).await;
        let entry = fox_lock.read().await;
        assert_eq!(entry.total_votes, 50);
        assert_eq!(entry.votes.len(), 50);
    }

    #[tokio::test]
    async fn concurrent_ratings_both_land() {
        let service = Arc::new(service_with(ScriptedSeed::default()));
        let joke_id = seeded_joke(&service).await;

        let a = {
            let svc = Arc::clone(&service);
            let id = joke_id.clone();
            tokio::spawn(async move { svc.rate_joke(&id, None, 5).await })
        };
        let b = {
            let svc = Arc::clone(&service);
            let id = joke_id.clone();
            tokio::spawn(async move { svc.rate_joke(&id, None, 3).await })
        };
        let (ra, rb) = (a.await, b.await);
        assert!(matches!(ra, Ok(Ok(_))));
        assert!(matches!(rb, Ok(Ok(_))));

        let Ok(lock) = service.registry().joke(&joke_id).await else {
            panic!("joke missing");
        };
        let joke = lock.read().await;
        assert_eq!(joke.total_ratings, 2);
        assert!((joke.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn submissions_publish_stats_and_leaderboard_hint() {
        let service = service_with(ScriptedSeed::default());
        let mut rx = service.event_bus().subscribe();

        let _ = service.submit_vote(FoxNumber::new(3), None).await;

        let first = rx.recv().await;
        let Ok(first) = first else {
            panic!("expected vote update");
        };
        assert_eq!(first.event_type_str(), "vote_update");

        let second = rx.recv().await;
        let Ok(second) = second else {
            panic!("expected leaderboard hint");
        };
        assert_eq!(second.event_type_str(), "leaderboard_hint");
    }

    #[tokio::test]
    async fn top_rated_orders_by_average_then_count() {
        let service = service_with(ScriptedSeed::default());
        for (id, ratings) in [
            ("a", vec![4, 5, 4, 5]),    // avg 4.5, n 4
            ("b", vec![4, 5]),          // avg 4.5, n 2
            ("c", vec![4, 4, 4, 4, 4]), // avg 4.0, n 5
        ] {
            let lock = service
                .registry()
                .joke_or_insert(JokeEntry::new(
                    JokeId::new(id),
                    "t".to_string(),
                    "general".to_string(),
                ))
                .await;
            drop(lock);
            for value in ratings {
                let _ = service.rate_joke(&JokeId::new(id), None, value).await;
            }
        }

        let top = service.top_rated_jokes(10).await;
        let order: Vec<_> = top.iter().map(|j| j.joke_id.as_str().to_string()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn leaderboard_only_counts_registered_votes() {
        let service = service_with(ScriptedSeed::default());
        let Ok(user) = service.register_user("reven", "rev@example.com").await else {
            panic!("registration failed");
        };

        let _ = service.submit_vote(FoxNumber::new(1), None).await;
        let _ = service.submit_vote(FoxNumber::new(2), Some(user.user_id)).await;

        let board = service.fox_leaderboard(DEFAULT_LEADERBOARD_LIMIT).await;
        assert_eq!(board.len(), 1);
        let Some(top) = board.first() else {
            panic!("leaderboard empty");
        };
        assert_eq!(top.fox_number, FoxNumber::new(2));
    }

    #[tokio::test]
    async fn most_popular_on_no_votes_is_none() {
        let service = service_with(ScriptedSeed::default());
        assert!(service.most_popular_fox().await.is_none());

        let _ = service.registry().fox_or_insert(FoxNumber::new(1), None).await;
        // Existing but unvoted foxes still yield no data.
        assert!(service.most_popular_fox().await.is_none());

        let _ = service.submit_vote(FoxNumber::new(4), None).await;
        let _ = service.submit_vote(FoxNumber::new(4), None).await;
        let _ = service.submit_vote(FoxNumber::new(6), None).await;

        let Some(popular) = service.most_popular_fox().await else {
            panic!("expected a popular fox");
        };
        assert_eq!(popular.fox_number, FoxNumber::new(4));
    }

    #[tokio::test]
    async fn random_pair_is_distinct_despite_collisions() {
        // Source repeats fox 5 twice before yielding 6.
        let service = service_with(ScriptedSeed::with_foxes(vec![5, 5, 5, 6]));
        let (first, second) = service.random_fox_pair().await;
        assert_ne!(first.fox_number, second.fox_number);
    }

    #[tokio::test]
    async fn random_pair_falls_back_when_upstream_fails() {
        let service = service_with(ScriptedSeed::failing());
        let (first, second) = service.random_fox_pair().await;
        assert_ne!(first.fox_number, second.fox_number);
        // Both fallback foxes were upserted into the registry.
        assert_eq!(service.registry().fox_count().await, 2);
    }

    #[tokio::test]
    async fn random_joke_seeds_registry() {
        let service = service_with(ScriptedSeed::default());
        let joke = service.random_joke().await;
        assert_eq!(joke.joke_id, JokeId::new("official_1"));
        assert_eq!(service.registry().joke_count().await, 1);

        // Second draw returns the existing entry, not a fresh one.
        let _ = service.rate_joke(&joke.joke_id, None, 5).await;
        let again = service.random_joke().await;
        assert_eq!(again.total_ratings, 1);
    }

    #[tokio::test]
    async fn random_joke_falls_back_when_upstream_fails() {
        let service = service_with(ScriptedSeed::failing());
        let joke = service.random_joke().await;
        assert!(joke.joke_id.as_str().starts_with("fallback_"));
        assert_eq!(service.registry().joke_count().await, 1);
    }

    #[tokio::test]
    async fn register_user_validates_input() {
        let service = service_with(ScriptedSeed::default());
        assert!(service.register_user("ab", "a@b.com").await.is_err());
        assert!(service.register_user("valid", "not-an-email").await.is_err());
        assert!(service.register_user("valid", "a@b.com").await.is_ok());
        // Duplicate username.
        assert!(service.register_user("valid", "c@d.com").await.is_err());
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let service = service_with(ScriptedSeed::default());
        let result = service.user_profile(UserId::new()).await;
        assert!(matches!(result, Err(GatewayError::UserNotFound(_))));
    }
}
