//! Access token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use tokenhub_core::config::AuthConfig;
use tokenhub_core::error::AppError;
use tokenhub_core::result::AppResult;

use super::claims::AccessClaims;

/// Creates signed HS256 access tokens.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Value of the `iss` claim.
    issuer: String,
    /// Value of the `aud` claim.
    audience: String,
    /// Access token lifetime.
    ttl: Duration,
}

/// A freshly signed access token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedAccessToken {
    /// The compact JWT.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AccessTokenIssuer {
    /// Creates a new issuer from auth configuration.
    ///
    /// Fails with a `Configuration` error when no signing secret is set or
    /// the TTL is out of range.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        config.validate()?;
        let ttl = i64::try_from(config.access_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| AppError::configuration("auth.access_ttl_minutes is out of range"))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret()?),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl,
        })
    }

    /// Issues an access token for `user_id` valid from now.
    pub fn issue(&self, user_id: Uuid) -> AppResult<IssuedAccessToken> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues an access token as if the clock read `issued_at`.
    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> AppResult<IssuedAccessToken> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Access token expiry is out of range"))?;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedAccessToken { token, expires_at })
    }
}
