//! Access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use tokenhub_core::config::AuthConfig;
use tokenhub_core::result::AppResult;

use super::claims::AccessClaims;
use super::error::TokenError;

/// Validates access tokens minted by [`super::AccessTokenIssuer`].
#[derive(Clone)]
pub struct AccessTokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    /// Creates a new verifier from auth configuration.
    ///
    /// Rejects the same configurations as [`AuthConfig::validate`].
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        config.validate()?;
        let secret = config.signing_secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.clock_skew_seconds;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration and not-before, with the configured leeway
    /// 3. Issuer and audience
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
