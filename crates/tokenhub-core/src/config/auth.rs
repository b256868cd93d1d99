//! Access token and password configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `access_ttl_minutes` (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

/// Upper bound for `clock_skew_seconds`.
pub const MAX_CLOCK_SKEW_SECONDS: u64 = 300;

/// Authentication and credential configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing (HMAC-SHA256).
    ///
    /// There is no default: an empty secret fails validation at startup.
    #[serde(default)]
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Value of the single `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Leeway applied to `exp` and `nbf` checks, in seconds.
    #[serde(default)]
    pub clock_skew_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Checks that a signing secret is present and the TTL and leeway are usable.
    pub fn validate(&self) -> Result<(), AppError> {
        self.signing_secret()?;
        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.access_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_minutes must be between 1 and {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if self.clock_skew_seconds > MAX_CLOCK_SKEW_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.clock_skew_seconds must not exceed {MAX_CLOCK_SKEW_SECONDS}"
            )));
        }
        Ok(())
    }

    /// The HMAC key bytes. A blank secret is a `Configuration` error.
    pub fn signing_secret(&self) -> Result<&[u8], AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "Missing signing secret: set auth.jwt_secret (TOKENHUB__AUTH__JWT_SECRET)",
            ));
        }
        Ok(self.jwt_secret.as_bytes())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            access_ttl_minutes: default_access_ttl(),
            clock_skew_seconds: 0,
            password_min_length: default_password_min(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .field("password_min_length", &self.password_min_length)
            .finish()
    }
}

fn default_issuer() -> String {
    "tokenhub".to_string()
}

fn default_audience() -> String {
    "tokenhub".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_password_min() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig {
            jwt_secret: "super-secret-value".to_string(),
            ..AuthConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_whitespace_secret_rejected() {
        let config = AuthConfig {
            jwt_secret: "   ".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_ttl_and_skew_bounds() {
        let base = AuthConfig {
            jwt_secret: "s3cret".to_string(),
            ..AuthConfig::default()
        };
        let at_limit = AuthConfig {
            access_ttl_minutes: MAX_ACCESS_TTL_MINUTES,
            clock_skew_seconds: MAX_CLOCK_SKEW_SECONDS,
            ..base.clone()
        };
        assert!(at_limit.validate().is_ok());

        let long_ttl = AuthConfig {
            access_ttl_minutes: u64::MAX,
            ..base.clone()
        };
        assert!(long_ttl.validate().is_err());

        let wide_skew = AuthConfig {
            clock_skew_seconds: MAX_CLOCK_SKEW_SECONDS + 1,
            ..base
        };
        assert!(wide_skew.validate().is_err());
    }
}
