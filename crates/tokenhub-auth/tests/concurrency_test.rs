//! Concurrent rotation of a single refresh secret.

mod helpers;

use tokenhub_core::error::ErrorKind;

use helpers::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_single_winner() {
    let app = TestApp::new();
    let profile = app.register("race@example.com").await;
    let tokens = app.login("race@example.com", true).await;

    let a = {
        let sessions = app.sessions.clone();
        let secret = tokens.refresh_token.clone();
        tokio::spawn(async move { sessions.refresh(&secret).await })
    };
    let b = {
        let sessions = app.sessions.clone();
        let secret = tokens.refresh_token.clone();
        tokio::spawn(async move { sessions.refresh(&secret).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.kind, ErrorKind::InvalidRefreshToken);

    let records = app.refresh_store.records_for_user(profile.id).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.is_active()).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_refreshes_create_one_successor() {
    let app = TestApp::new();
    let profile = app.register("stampede@example.com").await;
    let tokens = app.login("stampede@example.com", false).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let sessions = app.sessions.clone();
            let secret = tokens.refresh_token.clone();
            tokio::spawn(async move { sessions.refresh(&secret).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(app.refresh_store.records_for_user(profile.id).await.len(), 2);
}
