//! Refresh token lifecycle: issue, rotate-on-use, revoke, purge.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tokenhub_core::config::SessionConfig;
use tokenhub_core::error::AppError;
use tokenhub_core::result::AppResult;
use tokenhub_database::store::RefreshTokenStore;
use tokenhub_entity::refresh_token::{
    CreateRefreshToken, RefreshToken, RefreshTtlPolicy, RotateRefreshToken,
};

use super::secret;

/// A newly persisted refresh token and the plaintext the client receives.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    /// Opaque secret, returned to the caller once and never stored.
    pub plaintext: String,
    /// The persisted record.
    pub record: RefreshToken,
}

/// Outcome of a successful rotation.
#[derive(Clone)]
pub struct RotatedRefreshToken {
    /// Secret of the successor record.
    pub plaintext: String,
    /// The successor record.
    pub record: RefreshToken,
    /// The presented record, now revoked.
    pub previous: RefreshToken,
}

impl IssuedRefreshToken {
    /// Owner of the record.
    pub fn user_id(&self) -> Uuid {
        self.record.user_id
    }

    /// When the record stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.record.expires_at
    }
}

impl From<RotatedRefreshToken> for IssuedRefreshToken {
    fn from(rotated: RotatedRefreshToken) -> Self {
        Self {
            plaintext: rotated.plaintext,
            record: rotated.record,
        }
    }
}

impl std::fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("plaintext", &"<redacted>")
            .field("record", &self.record)
            .finish()
    }
}

impl std::fmt::Debug for RotatedRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatedRefreshToken")
            .field("plaintext", &"<redacted>")
            .field("record", &self.record)
            .field("previous", &self.previous)
            .finish()
    }
}

/// Issues, rotates and revokes opaque refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenManager {
    /// Record persistence.
    store: Arc<dyn RefreshTokenStore>,
    /// Lifetime policy.
    policy: RefreshTtlPolicy,
}

impl std::fmt::Debug for RefreshTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenManager")
            .field("policy", &self.policy)
            .finish()
    }
}

impl RefreshTokenManager {
    /// Creates a manager over `store` with lifetimes from `config`.
    ///
    /// Fails with a `Configuration` error when the lifetimes are out of range.
    pub fn new(store: Arc<dyn RefreshTokenStore>, config: &SessionConfig) -> AppResult<Self> {
        config.validate()?;
        let policy =
            RefreshTtlPolicy::from_days(config.refresh_ttl_days, config.short_refresh_ttl_days)
                .ok_or_else(|| AppError::configuration("Refresh token lifetime is out of range"))?;
        Ok(Self { store, policy })
    }

    /// Lifetime policy in effect.
    pub fn policy(&self) -> RefreshTtlPolicy {
        self.policy
    }

    /// Mints and persists a record for `user_id` expiring after `ttl`.
    pub async fn issue(&self, user_id: Uuid, ttl: Duration) -> AppResult<IssuedRefreshToken> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::configuration("Refresh token lifetime is out of range"))?;
        let minted = secret::mint()?;
        let record = self
            .store
            .create(&CreateRefreshToken {
                user_id,
                token_hash: minted.digest,
                expires_at,
            })
            .await?;

        debug!(user_id = %user_id, record_id = %record.id, "Refresh token issued");

        Ok(IssuedRefreshToken {
            plaintext: minted.plaintext,
            record,
        })
    }

    /// Exchanges a presented secret for a successor (rotate-on-use).
    ///
    /// The presented record is revoked before its successor exists, both in
    /// one store transaction. The successor inherits the remaining lifetime,
    /// or the default lifetime when none remains. Unknown, expired, revoked
    /// and already-rotated secrets all fail with the same
    /// `InvalidRefreshToken` error.
    pub async fn rotate(&self, presented: &str) -> AppResult<RotatedRefreshToken> {
        if presented.is_empty() {
            return Err(AppError::invalid_refresh_token());
        }

        let replacement = secret::mint()?;
        let step = RotateRefreshToken {
            presented_hash: secret::digest(presented),
            replacement_hash: replacement.digest,
            now: Utc::now(),
            policy: self.policy,
        };

        let Some(rotated) = self.store.rotate(&step).await? else {
            warn!("Refresh rejected: no active record for presented token");
            return Err(AppError::invalid_refresh_token());
        };

        info!(
            user_id = %rotated.successor.user_id,
            previous_id = %rotated.revoked.id,
            record_id = %rotated.successor.id,
            "Refresh token rotated"
        );

        Ok(RotatedRefreshToken {
            plaintext: replacement.plaintext,
            record: rotated.successor,
            previous: rotated.revoked,
        })
    }

    /// Revokes the record behind a presented secret.
    ///
    /// Idempotent: unknown or already revoked secrets return `Ok(false)`.
    pub async fn revoke(&self, presented: &str) -> AppResult<bool> {
        if presented.is_empty() {
            return Ok(false);
        }
        let revoked = self
            .store
            .revoke_by_hash(&secret::digest(presented), Utc::now())
            .await?;
        debug!(revoked, "Refresh token revocation processed");
        Ok(revoked)
    }

    /// Revokes every active record of a user.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.store.revoke_all_for_user(user_id, Utc::now()).await?;
        info!(user_id = %user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Number of a user's records that are active right now.
    pub async fn count_active_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.store.count_active_for_user(user_id, Utc::now()).await
    }

    /// Deletes records that expired or were revoked more than `retention` ago.
    pub async fn purge(&self, retention: Duration) -> AppResult<u64> {
        let cutoff = Utc::now()
            .checked_sub_signed(retention)
            .ok_or_else(|| AppError::validation("Purge retention is out of range"))?;
        let purged = self.store.purge_stale(cutoff).await?;
        if purged > 0 {
            info!(purged, cutoff = %cutoff, "Purged stale refresh tokens");
        }
        Ok(purged)
    }
}
