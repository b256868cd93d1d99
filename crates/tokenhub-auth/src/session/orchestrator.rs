//! Session orchestrator: register, login, refresh, logout and `me` flows.
//!
//! Composes the credential store, the password hasher, the access token
//! issuer and verifier, and the refresh token manager. Holds no session
//! state of its own: every call is answered from the stores.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use tokenhub_core::config::{AppConfig, CookieConfig};
use tokenhub_core::error::AppError;
use tokenhub_core::result::AppResult;
use tokenhub_database::store::{CredentialStore, RefreshTokenStore};
use tokenhub_entity::user::{CreateUser, UserProfile};

use crate::jwt::{AccessTokenIssuer, AccessTokenVerifier};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::refresh::{IssuedRefreshToken, RefreshTokenManager};

use super::cookie::RefreshCookie;
use super::request::{ChangePasswordRequest, LoginRequest, RegisterRequest};

/// Credentials handed to the client after login or refresh.
#[derive(Clone, Serialize)]
pub struct SessionTokens {
    /// The authenticated user.
    pub user_id: Uuid,
    /// Signed access token.
    pub access_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Opaque refresh secret.
    pub refresh_token: String,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
    /// Cookie carrying the refresh secret.
    pub cookie: RefreshCookie,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("user_id", &self.user_id)
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}

/// Result of a logout. Logout never fails.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutOutcome {
    /// Whether a record was actually revoked.
    pub revoked: bool,
    /// Cookie that clears the refresh secret on the client.
    pub cookie: RefreshCookie,
}

/// Drives the session state machine.
#[derive(Clone)]
pub struct SessionOrchestrator {
    /// User persistence.
    users: Arc<dyn CredentialStore>,
    /// Refresh token lifecycle.
    refresh_tokens: RefreshTokenManager,
    /// Access token signing.
    issuer: AccessTokenIssuer,
    /// Access token validation.
    verifier: AccessTokenVerifier,
    /// Password hasher.
    password_hasher: PasswordHasher,
    /// Password policy.
    password_validator: PasswordValidator,
    /// Refresh cookie attributes.
    cookie_config: CookieConfig,
    /// Default retention for purging stale refresh tokens.
    purge_retention: Duration,
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("refresh_tokens", &self.refresh_tokens)
            .field("issuer", &self.issuer)
            .field("cookie_config", &self.cookie_config)
            .finish()
    }
}

impl SessionOrchestrator {
    /// Builds the orchestrator from validated configuration and stores.
    ///
    /// Fails with a `Configuration` error when no signing secret is set or
    /// a lifetime is out of range.
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn CredentialStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
    ) -> AppResult<Self> {
        let purge_retention = i64::try_from(config.session.purge_retention_days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(|| AppError::configuration("session.purge_retention_days is out of range"))?;

        Ok(Self {
            users,
            refresh_tokens: RefreshTokenManager::new(refresh_store, &config.session)?,
            issuer: AccessTokenIssuer::new(&config.auth)?,
            verifier: AccessTokenVerifier::new(&config.auth)?,
            password_hasher: PasswordHasher::new(),
            password_validator: PasswordValidator::new(&config.auth),
            cookie_config: config.cookie.clone(),
            purge_retention,
        })
    }

    /// The refresh token manager in use.
    pub fn refresh_tokens(&self) -> &RefreshTokenManager {
        &self.refresh_tokens
    }

    /// Creates an account.
    ///
    /// A duplicate email fails with a `Conflict` error.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<UserProfile> {
        req.validate()?;
        self.password_validator.validate(&req.password)?;

        let password_hash = self.password_hasher.hash_password(&req.password)?;
        let user = self
            .users
            .create(&CreateUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user.profile())
    }

    /// Password login.
    ///
    /// Unknown email, wrong password and an unreadable stored hash all fail
    /// with the same `InvalidCredentials` error.
    pub async fn login(&self, req: LoginRequest) -> AppResult<SessionTokens> {
        req.validate()?;

        let Some(user) = self.users.find_by_email(&req.email).await? else {
            self.password_hasher.verify_dummy(&req.password);
            warn!("Login failed: invalid credentials");
            return Err(AppError::invalid_credentials());
        };

        let matched = self
            .password_hasher
            .verify_password(&req.password, &user.password_hash)
            .unwrap_or_else(|e| {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                false
            });
        if !matched {
            warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AppError::invalid_credentials());
        }

        let ttl = self.refresh_tokens.policy().login_ttl(req.remember_me);
        let refresh = self.refresh_tokens.issue(user.id, ttl).await?;
        let tokens = self.session_tokens(refresh)?;

        info!(
            user_id = %user.id,
            remember_me = req.remember_me,
            "User logged in"
        );
        Ok(tokens)
    }

    /// Exchanges a refresh secret for a new access token and a successor
    /// secret. The presented secret is spent either way.
    pub async fn refresh(&self, presented: &str) -> AppResult<SessionTokens> {
        let rotated = self.refresh_tokens.rotate(presented).await?;
        self.session_tokens(rotated.into())
    }

    /// Revokes the presented secret, if any, and clears the cookie.
    ///
    /// Store failures are logged and swallowed.
    pub async fn logout(&self, presented: Option<&str>) -> LogoutOutcome {
        let revoked = match presented {
            Some(token) if !token.is_empty() => match self.refresh_tokens.revoke(token).await {
                Ok(revoked) => revoked,
                Err(e) => {
                    error!(error = %e, "Failed to revoke refresh token during logout");
                    false
                }
            },
            _ => false,
        };

        LogoutOutcome {
            revoked,
            cookie: RefreshCookie::clear(&self.cookie_config),
        }
    }

    /// Resolves an access token to the profile of its subject.
    ///
    /// Invalid and expired tokens, and subjects that no longer exist, all
    /// fail with the same `Unauthorized` error.
    pub async fn me(&self, access_token: &str) -> AppResult<UserProfile> {
        let claims = self.verifier.verify(access_token).map_err(|e| {
            warn!(reason = %e, "Access token rejected");
            AppError::from(e)
        })?;
        let user_id = claims.user_id()?;

        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.profile()),
            None => {
                warn!(user_id = %user_id, "Access token subject no longer exists");
                Err(AppError::unauthorized())
            }
        }
    }

    /// Changes a user's password and revokes all of their refresh tokens.
    ///
    /// Returns the number of revoked refresh tokens.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> AppResult<u64> {
        req.validate()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if !self
            .password_hasher
            .verify_password(&req.current_password, &user.password_hash)?
        {
            warn!(user_id = %user_id, "Password change failed: invalid credentials");
            return Err(AppError::invalid_credentials());
        }

        self.password_validator
            .validate_not_same(&req.current_password, &req.new_password)?;
        self.password_validator.validate(&req.new_password)?;

        let password_hash = self.password_hasher.hash_password(&req.new_password)?;
        if !self.users.update_password_hash(user_id, &password_hash).await? {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "Password changed");
        Ok(revoked)
    }

    /// Revokes every active refresh token of a user.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        self.refresh_tokens.revoke_all_for_user(user_id).await
    }

    /// Deletes refresh tokens expired or revoked more than `retention` ago,
    /// or the configured retention when `None`.
    pub async fn purge_expired(&self, retention: Option<Duration>) -> AppResult<u64> {
        self.refresh_tokens
            .purge(retention.unwrap_or(self.purge_retention))
            .await
    }

    fn session_tokens(&self, refresh: IssuedRefreshToken) -> AppResult<SessionTokens> {
        let now = Utc::now();
        let access = self.issuer.issue_at(refresh.user_id(), now)?;
        let cookie = RefreshCookie::issue(
            &self.cookie_config,
            refresh.plaintext.clone(),
            refresh.expires_at(),
            now,
        );

        Ok(SessionTokens {
            user_id: refresh.user_id(),
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at(),
            refresh_token: refresh.plaintext,
            cookie,
        })
    }
}
