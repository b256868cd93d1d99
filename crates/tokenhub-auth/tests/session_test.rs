//! Integration tests for the session lifecycle.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};

use tokenhub_auth::refresh::digest;
use tokenhub_auth::{
    AccessTokenIssuer, ChangePasswordRequest, LoginRequest, RegisterRequest, SessionOrchestrator,
};
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::ErrorKind;
use tokenhub_database::memory::MemoryCredentialStore;
use tokenhub_database::store::CredentialStore;

use helpers::{FailingRefreshStore, PASSWORD, TestApp, test_config};

#[tokio::test]
async fn test_register_returns_profile() {
    let app = TestApp::new();
    let profile = app.register("ada@example.com").await;
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.name, "Test User");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("dup@example.com").await;

    let err = app
        .sessions
        .register(RegisterRequest {
            name: "Someone Else".to_string(),
            email: "dup@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = TestApp::new();

    let bad_email = app
        .sessions
        .register(RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(bad_email.kind, ErrorKind::Validation);

    let short_password = app
        .sessions
        .register(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(short_password.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_login_creates_one_active_record() {
    let app = TestApp::new();
    let profile = app.register("login@example.com").await;
    let tokens = app.login("login@example.com", true).await;

    let records = app.refresh_store.records_for_user(profile.id).await;
    let matching: Vec<_> = records
        .iter()
        .filter(|r| r.token_hash == digest(&tokens.refresh_token) && r.is_active())
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(tokens.user_id, profile.id);
    assert_eq!(tokens.cookie.value, tokens.refresh_token);
}

#[tokio::test]
async fn test_remember_me_selects_refresh_lifetime() {
    let app = TestApp::new();
    app.register("ttl@example.com").await;

    let short = app.login("ttl@example.com", false).await;
    let remaining = short.refresh_expires_at - Utc::now();
    assert!(remaining <= Duration::days(7));
    assert!(remaining > Duration::days(7) - Duration::minutes(1));
    assert!(short.cookie.max_age <= 7 * 24 * 3600);
    assert!(short.cookie.max_age > 7 * 24 * 3600 - 60);

    let long = app.login("ttl@example.com", true).await;
    let remaining = long.refresh_expires_at - Utc::now();
    assert!(remaining <= Duration::days(30));
    assert!(remaining > Duration::days(30) - Duration::minutes(1));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("known@example.com").await;

    let wrong_password = app
        .sessions
        .login(LoginRequest {
            email: "known@example.com".to_string(),
            password: "wrong-password-1".to_string(),
            remember_me: false,
        })
        .await
        .unwrap_err();
    let unknown_email = app
        .sessions
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: PASSWORD.to_string(),
            remember_me: false,
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password.kind, ErrorKind::InvalidCredentials);
    assert_eq!(wrong_password.kind, unknown_email.kind);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_unreadable_stored_hash_fails_like_unknown_email() {
    let app = TestApp::new();
    let profile = app.register("corrupt@example.com").await;
    assert!(
        app.users
            .update_password_hash(profile.id, "not-a-phc-string")
            .await
            .unwrap()
    );

    let login = |email: &str| {
        app.sessions.login(LoginRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            remember_me: false,
        })
    };
    let corrupt = login("corrupt@example.com").await.unwrap_err();
    let unknown = login("nobody@example.com").await.unwrap_err();

    assert_eq!(corrupt.kind, ErrorKind::InvalidCredentials);
    assert_eq!(corrupt.to_string(), unknown.to_string());
    assert!(app.refresh_store.records_for_user(profile.id).await.is_empty());
}

#[tokio::test]
async fn test_out_of_range_lifetimes_fail_at_construction() {
    let build = |adjust: fn(&mut AppConfig)| {
        let mut config = test_config();
        adjust(&mut config);
        SessionOrchestrator::new(
            &config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(FailingRefreshStore),
        )
    };

    let adjustments: [fn(&mut AppConfig); 4] = [
        |c: &mut AppConfig| c.session.refresh_ttl_days = 200_000_000,
        |c: &mut AppConfig| c.session.short_refresh_ttl_days = u64::MAX,
        |c: &mut AppConfig| c.session.purge_retention_days = u64::MAX,
        |c: &mut AppConfig| c.auth.access_ttl_minutes = u64::MAX,
    ];
    for adjust in adjustments {
        let err = build(adjust).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}

#[tokio::test]
async fn test_refresh_rotates_and_spends_secret() {
    let app = TestApp::new();
    app.register("rotate@example.com").await;
    let first = app.login("rotate@example.com", true).await;

    let second = app.sessions.refresh(&first.refresh_token).await.unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);
    assert_eq!(second.user_id, first.user_id);

    let err = app.sessions.refresh(&first.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefreshToken);
    assert_eq!(err.message, "Invalid refresh token");

    assert!(app.sessions.refresh(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_rotation_preserves_remaining_lifetime() {
    let app = TestApp::new();
    let profile = app.register("slide@example.com").await;
    let issued = app
        .sessions
        .refresh_tokens()
        .issue(profile.id, Duration::days(2))
        .await
        .unwrap();

    let rotated = app.sessions.refresh(&issued.plaintext).await.unwrap();
    assert_eq!(rotated.refresh_expires_at, issued.expires_at());
    let remaining = rotated.refresh_expires_at - Utc::now();
    assert!(remaining <= Duration::days(2));
    assert!(remaining > Duration::days(2) - Duration::minutes(1));
}

#[tokio::test]
async fn test_refresh_rejects_unknown_and_empty() {
    let app = TestApp::new();
    let unknown = app.sessions.refresh("bogus").await.unwrap_err();
    let empty = app.sessions.refresh("").await.unwrap_err();
    assert_eq!(unknown.kind, ErrorKind::InvalidRefreshToken);
    assert_eq!(unknown.to_string(), empty.to_string());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::new();
    app.register("bye@example.com").await;
    let tokens = app.login("bye@example.com", false).await;

    let first = app.sessions.logout(Some(&tokens.refresh_token)).await;
    assert!(first.revoked);
    assert!(first.cookie.is_clearing());

    let again = app.sessions.logout(Some(&tokens.refresh_token)).await;
    assert!(!again.revoked);
    assert!(again.cookie.is_clearing());

    let unknown = app.sessions.logout(Some("unknown")).await;
    assert!(!unknown.revoked);
    let absent = app.sessions.logout(None).await;
    assert!(!absent.revoked);
    assert_eq!(
        absent.cookie.to_header_value(),
        "refresh_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    );

    let err = app.sessions.refresh(&tokens.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefreshToken);
}

#[tokio::test]
async fn test_logout_swallows_store_errors() {
    let sessions = SessionOrchestrator::new(
        &helpers::test_config(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FailingRefreshStore),
    )
    .unwrap();

    let outcome = sessions.logout(Some("anything")).await;
    assert!(!outcome.revoked);
    assert!(outcome.cookie.is_clearing());
}

#[tokio::test]
async fn test_store_failure_during_refresh_is_database_error() {
    let sessions = SessionOrchestrator::new(
        &helpers::test_config(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FailingRefreshStore),
    )
    .unwrap();

    let err = sessions.refresh("anything").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::new();
    let profile = app.register("me@example.com").await;
    let tokens = app.login("me@example.com", false).await;

    let me = app.sessions.me(&tokens.access_token).await.unwrap();
    assert_eq!(me.id, profile.id);
    assert_eq!(me.email, "me@example.com");
}

#[tokio::test]
async fn test_access_token_lifetime_enforced() {
    let app = TestApp::new();
    let profile = app.register("clock@example.com").await;
    let issuer = AccessTokenIssuer::new(&app.config.auth).unwrap();

    let fresh = issuer
        .issue_at(profile.id, Utc::now() - Duration::minutes(14))
        .unwrap();
    assert!(app.sessions.me(&fresh.token).await.is_ok());

    let stale = issuer
        .issue_at(profile.id, Utc::now() - Duration::minutes(16))
        .unwrap();
    let err = app.sessions.me(&stale.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_me_rejects_garbage_and_foreign_tokens() {
    let app = TestApp::new();
    let profile = app.register("foreign@example.com").await;

    let garbage = app.sessions.me("garbage").await.unwrap_err();
    assert_eq!(garbage.kind, ErrorKind::Unauthorized);

    let mut other = app.config.auth.clone();
    other.jwt_secret = "someone-elses-secret".to_string();
    let forged = AccessTokenIssuer::new(&other)
        .unwrap()
        .issue(profile.id)
        .unwrap();
    let err = app.sessions.me(&forged.token).await.unwrap_err();
    assert_eq!(err.to_string(), garbage.to_string());
}

#[tokio::test]
async fn test_me_rejects_deleted_subject() {
    let app = TestApp::new();
    let profile = app.register("gone@example.com").await;
    let tokens = app.login("gone@example.com", false).await;

    assert!(app.users.remove(profile.id).await);
    let err = app.sessions.me(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_change_password_revokes_sessions() {
    let app = TestApp::new();
    let profile = app.register("change@example.com").await;
    let a = app.login("change@example.com", true).await;
    let b = app.login("change@example.com", false).await;

    let revoked = app
        .sessions
        .change_password(
            profile.id,
            ChangePasswordRequest {
                current_password: PASSWORD.to_string(),
                new_password: "brand-new-pass-2".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(revoked, 2);
    assert!(app.sessions.refresh(&a.refresh_token).await.is_err());
    assert!(app.sessions.refresh(&b.refresh_token).await.is_err());

    let old = app
        .sessions
        .login(LoginRequest {
            email: "change@example.com".to_string(),
            password: PASSWORD.to_string(),
            remember_me: false,
        })
        .await
        .unwrap_err();
    assert_eq!(old.kind, ErrorKind::InvalidCredentials);

    assert!(
        app.sessions
            .login(LoginRequest {
                email: "change@example.com".to_string(),
                password: "brand-new-pass-2".to_string(),
                remember_me: false,
            })
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let app = TestApp::new();
    let profile = app.register("guard@example.com").await;
    app.login("guard@example.com", true).await;

    let err = app
        .sessions
        .change_password(
            profile.id,
            ChangePasswordRequest {
                current_password: "not-my-password-1".to_string(),
                new_password: "brand-new-pass-2".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert_eq!(
        app.sessions
            .refresh_tokens()
            .count_active_for_user(profile.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_revoke_all_sessions() {
    let app = TestApp::new();
    let profile = app.register("ops@example.com").await;
    let tokens = app.login("ops@example.com", true).await;
    app.login("ops@example.com", true).await;

    assert_eq!(app.sessions.revoke_all_sessions(profile.id).await.unwrap(), 2);
    assert_eq!(app.sessions.revoke_all_sessions(profile.id).await.unwrap(), 0);
    assert!(app.sessions.refresh(&tokens.refresh_token).await.is_err());
}

#[tokio::test]
async fn test_purge_expired_removes_spent_records() {
    let app = TestApp::new();
    let profile = app.register("purge@example.com").await;
    let tokens = app.login("purge@example.com", true).await;
    app.sessions.refresh(&tokens.refresh_token).await.unwrap();

    assert_eq!(app.sessions.purge_expired(None).await.unwrap(), 0);
    assert_eq!(
        app.sessions
            .purge_expired(Some(Duration::seconds(-1)))
            .await
            .unwrap(),
        1
    );
    assert_eq!(app.refresh_store.records_for_user(profile.id).await.len(), 1);
}

#[tokio::test]
async fn test_cookie_settings_flow_into_tokens() {
    let app = TestApp::with_config(|config| {
        config.cookie.secure = true;
        config.cookie.name = "rt".to_string();
    });
    app.register("cookie@example.com").await;
    let tokens = app.login("cookie@example.com", false).await;

    let header = tokens.cookie.to_header_value();
    assert!(header.starts_with(&format!("rt={}", tokens.refresh_token)));
    assert!(header.contains("HttpOnly"));
    assert!(header.ends_with("; Secure"));
}
