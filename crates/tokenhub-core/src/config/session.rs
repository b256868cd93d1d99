//! Refresh token lifetime configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for both refresh lifetimes (ten years).
pub const MAX_REFRESH_TTL_DAYS: u64 = 3650;

/// Upper bound for `purge_retention_days`, also applied to `tokens purge --retention-days`.
pub const MAX_PURGE_RETENTION_DAYS: u64 = 3650;

/// Refresh token lifetime policy.
///
/// A login with "remember me" set receives `refresh_ttl_days`; without it
/// the shorter `short_refresh_ttl_days` applies. Rotation never extends a
/// session past the lifetime granted at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Refresh token lifetime in days when "remember me" is not set.
    #[serde(default = "default_short_refresh_ttl")]
    pub short_refresh_ttl_days: u64,
    /// How long expired or revoked records are kept before purging, in days.
    #[serde(default = "default_purge_retention")]
    pub purge_retention_days: u64,
}

impl SessionConfig {
    /// Both lifetimes must lie in `1..=MAX_REFRESH_TTL_DAYS` and the
    /// retention must not exceed [`MAX_PURGE_RETENTION_DAYS`].
    pub fn validate(&self) -> Result<(), AppError> {
        for (key, days) in [
            ("session.refresh_ttl_days", self.refresh_ttl_days),
            ("session.short_refresh_ttl_days", self.short_refresh_ttl_days),
        ] {
            if !(1..=MAX_REFRESH_TTL_DAYS).contains(&days) {
                return Err(AppError::configuration(format!(
                    "{key} must be between 1 and {MAX_REFRESH_TTL_DAYS}"
                )));
            }
        }
        if self.purge_retention_days > MAX_PURGE_RETENTION_DAYS {
            return Err(AppError::configuration(format!(
                "session.purge_retention_days must not exceed {MAX_PURGE_RETENTION_DAYS}"
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_ttl_days: default_refresh_ttl(),
            short_refresh_ttl_days: default_short_refresh_ttl(),
            purge_retention_days: default_purge_retention(),
        }
    }
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_short_refresh_ttl() -> u64 {
    7
}

fn default_purge_retention() -> u64 {
    7
}
