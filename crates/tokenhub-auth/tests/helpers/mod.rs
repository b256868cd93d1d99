//! Shared test helpers for session integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tokenhub_auth::{LoginRequest, RegisterRequest, SessionOrchestrator, SessionTokens};
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::AppError;
use tokenhub_core::result::AppResult;
use tokenhub_database::memory::{MemoryCredentialStore, MemoryRefreshTokenStore};
use tokenhub_database::store::RefreshTokenStore;
use tokenhub_entity::refresh_token::{
    CreateRefreshToken, RefreshToken, RotateRefreshToken, RotatedRecords,
};
use tokenhub_entity::user::UserProfile;

/// Password that satisfies the default policy.
pub const PASSWORD: &str = "correct-horse-1";

/// Test application context backed by in-memory stores.
pub struct TestApp {
    /// The orchestrator under test.
    pub sessions: SessionOrchestrator,
    /// Credential store shared with the orchestrator.
    pub users: MemoryCredentialStore,
    /// Refresh token store shared with the orchestrator.
    pub refresh_store: MemoryRefreshTokenStore,
    /// Configuration the orchestrator was built from.
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with default settings.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the default settings.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = test_config();
        adjust(&mut config);

        let users = MemoryCredentialStore::new();
        let refresh_store = MemoryRefreshTokenStore::new();
        let sessions = SessionOrchestrator::new(
            &config,
            Arc::new(users.clone()),
            Arc::new(refresh_store.clone()),
        )
        .expect("orchestrator should build from test config");

        Self {
            sessions,
            users,
            refresh_store,
            config,
        }
    }

    /// Register a user with [`PASSWORD`].
    pub async fn register(&self, email: &str) -> UserProfile {
        self.sessions
            .register(RegisterRequest {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("registration should succeed")
    }

    /// Log in with [`PASSWORD`].
    pub async fn login(&self, email: &str, remember_me: bool) -> SessionTokens {
        self.sessions
            .login(LoginRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                remember_me,
            })
            .await
            .expect("login should succeed")
    }
}

/// Default configuration with a signing secret and database URL set.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "postgres://unused@localhost/tokenhub".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// A refresh token store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingRefreshStore;

fn unavailable() -> AppError {
    AppError::database("store unavailable")
}

#[async_trait]
impl RefreshTokenStore for FailingRefreshStore {
    async fn create(&self, _data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        Err(unavailable())
    }

    async fn rotate(&self, _step: &RotateRefreshToken) -> AppResult<Option<RotatedRecords>> {
        Err(unavailable())
    }

    async fn revoke_by_hash(&self, _token_hash: &str, _now: DateTime<Utc>) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn revoke_all_for_user(&self, _user_id: Uuid, _now: DateTime<Utc>) -> AppResult<u64> {
        Err(unavailable())
    }

    async fn count_active_for_user(
        &self,
        _user_id: Uuid,
        _now: DateTime<Utc>,
    ) -> AppResult<u64> {
        Err(unavailable())
    }

    async fn purge_stale(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
        Err(unavailable())
    }
}
