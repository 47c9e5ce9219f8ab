//! User-related DTOs for registration and profile lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserAccount;

/// Request body for `POST /users`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Desired username (3–20 characters).
    pub username: String,
    /// Email address.
    pub email: String,
}

/// User profile with lifetime submission counters.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfileResponse {
    /// Account identifier; send as `x-user-id` on authenticated requests.
    pub user_id: uuid::Uuid,
    /// Username.
    pub username: String,
    /// Email address, lowercase.
    pub email: String,
    /// Lifetime count of votes submitted while logged in.
    pub total_votes: u64,
    /// Lifetime count of ratings submitted while logged in.
    pub total_ratings: u64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserProfileResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            user_id: *account.user_id.as_uuid(),
            username: account.username,
            email: account.email,
            total_votes: account.total_votes,
            total_ratings: account.total_ratings,
            created_at: account.created_at,
        }
    }
}
