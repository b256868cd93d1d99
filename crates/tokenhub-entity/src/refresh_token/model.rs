//! Refresh token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::expiry::RefreshTtlPolicy;

/// A persisted refresh token record.
///
/// Only the SHA-256 digest of the opaque secret is stored; the plaintext
/// leaves the service exactly once, when the record is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,
    /// The user this record belongs to.
    pub user_id: Uuid,
    /// Hex SHA-256 digest of the opaque secret.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// When the record was revoked (rotated or logged out).
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A record is active iff it is not revoked and not yet expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Check whether the record is active right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Check whether the record has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Data required to persist a new refresh token record.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    /// Owning user.
    pub user_id: Uuid,
    /// Digest of the freshly minted secret.
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// One rotate-on-use step, executed by the store as a single transaction.
#[derive(Debug, Clone)]
pub struct RotateRefreshToken {
    /// Digest of the secret the client presented.
    pub presented_hash: String,
    /// Digest of the secret that replaces it.
    pub replacement_hash: String,
    /// Clock reading used for the active check, revocation and expiry.
    pub now: DateTime<Utc>,
    /// Lifetime policy for the successor record.
    pub policy: RefreshTtlPolicy,
}

impl RotateRefreshToken {
    /// Build the successor record for a claimed predecessor.
    pub fn successor_of(&self, claimed: &RefreshToken) -> CreateRefreshToken {
        CreateRefreshToken {
            user_id: claimed.user_id,
            token_hash: self.replacement_hash.clone(),
            expires_at: self.policy.successor_expiry(claimed.expires_at, self.now),
        }
    }
}

/// Result of a successful rotation.
#[derive(Debug, Clone)]
pub struct RotatedRecords {
    /// The presented record, now revoked.
    pub revoked: RefreshToken,
    /// The newly created record.
    pub successor: RefreshToken,
}
