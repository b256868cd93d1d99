//! Store traits the session engine is written against.
//!
//! Implemented by the PostgreSQL repositories in
//! [`crate::repositories`] and by the in-memory stores in [`crate::memory`].
//! Every method takes the caller's clock reading where the answer depends
//! on time, so both implementations agree on what "active" means.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tokenhub_core::result::AppResult;
use tokenhub_entity::refresh_token::{
    CreateRefreshToken, RefreshToken, RotateRefreshToken, RotatedRecords,
};
use tokenhub_entity::user::{CreateUser, User};

/// Persisted user records.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email, compared exactly as stored.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a user. A duplicate email fails with a `Conflict` error.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Replace a user's password hash. Returns `false` if the user is gone.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<bool>;
}

/// Persisted refresh token records.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a new record.
    async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken>;

    /// Rotate-on-use as one atomic step.
    ///
    /// Claims the record matching `step.presented_hash` if it is active at
    /// `step.now` by setting its revocation timestamp, then persists the
    /// successor built by [`RotateRefreshToken::successor_of`]. Returns
    /// `None` when no active record matched. Of any number of concurrent
    /// calls presenting the same digest, at most one returns `Some`.
    async fn rotate(&self, step: &RotateRefreshToken) -> AppResult<Option<RotatedRecords>>;

    /// Revoke the active record with this digest. Returns `true` if one was revoked.
    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke every active record of a user. Returns how many were revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Count a user's records that are active at `now`.
    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete records that expired or were revoked before `cutoff`.
    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
