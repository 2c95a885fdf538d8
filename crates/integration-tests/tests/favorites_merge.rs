//! End-to-end tests for the favorites flows.
//!
//! Covers anonymous durable persistence, the login-time union merge and its
//! idempotency, merge failure preserving the anonymous copy, and signed-in
//! best-effort pushes.

use std::collections::HashSet;

use persimmon_client::{FavoritesFile, SyncEngine};
use persimmon_core::{FavoriteEntry, ProductId, SessionToken};
use persimmon_integration_tests::{MockApi, TEST_TOKEN};

fn entries(ids: &[&str]) -> Vec<FavoriteEntry> {
    ids.iter()
        .map(|id| FavoriteEntry::new(ProductId::new(*id)))
        .collect()
}

fn as_id_set(entries: &[FavoriteEntry]) -> HashSet<String> {
    entries
        .iter()
        .map(|e| e.product.as_str().to_owned())
        .collect()
}

#[tokio::test]
async fn merge_on_login_unions_local_and_remote() {
    let mock = MockApi::spawn().await;
    mock.state.set_favorites(entries(&["Y"]));

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.favorites().add(ProductId::new("X"));

    engine
        .login(SessionToken::new(TEST_TOKEN))
        .await
        .expect("login");

    // Both sides end up as {X, Y} (set equality, order insignificant).
    let expected: HashSet<String> = ["X", "Y"].iter().map(ToString::to_string).collect();
    assert_eq!(as_id_set(&engine.favorites().entries()), expected);
    assert_eq!(as_id_set(&mock.state.favorites()), expected);

    // The anonymous durable copy has been handed over and cleared.
    let file = FavoritesFile::new(dir.path());
    assert!(file.load().expect("load").is_empty());
}

#[tokio::test]
async fn merge_is_idempotent() {
    let mock = MockApi::spawn().await;
    mock.state.set_favorites(entries(&["Y"]));

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.favorites().add(ProductId::new("X"));

    engine
        .login(SessionToken::new(TEST_TOKEN))
        .await
        .expect("login");
    // Re-running the account flows with no intervening local changes must
    // neither duplicate nor lose entries.
    engine.bootstrap().await.expect("second merge");

    let expected: HashSet<String> = ["X", "Y"].iter().map(ToString::to_string).collect();
    assert_eq!(engine.favorites().entries().len(), 2);
    assert_eq!(as_id_set(&engine.favorites().entries()), expected);
    assert_eq!(mock.state.favorites().len(), 2);
    assert_eq!(as_id_set(&mock.state.favorites()), expected);
}

#[tokio::test]
async fn merge_failure_preserves_anonymous_favorites() {
    let mock = MockApi::spawn().await;
    mock.state.fail_endpoint("favorites_fetch");

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.favorites().add(ProductId::new("X"));

    let result = engine.login(SessionToken::new(TEST_TOKEN)).await;
    assert!(result.is_err());

    // Soft failure: the durable copy survives so the merge can be retried.
    let file = FavoritesFile::new(dir.path());
    assert_eq!(file.load().expect("load"), entries(&["X"]));

    // Retry once the account API recovers.
    mock.state.restore_endpoint("favorites_fetch");
    engine.bootstrap().await.expect("retry");
    assert_eq!(as_id_set(&mock.state.favorites()), as_id_set(&entries(&["X"])));
    assert!(file.load().expect("load").is_empty());
}

#[tokio::test]
async fn failed_sync_push_preserves_anonymous_favorites() {
    let mock = MockApi::spawn().await;
    mock.state.set_favorites(entries(&["Y"]));
    mock.state.fail_endpoint("favorites_sync");

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.favorites().add(ProductId::new("X"));

    assert!(engine.login(SessionToken::new(TEST_TOKEN)).await.is_err());

    let file = FavoritesFile::new(dir.path());
    assert_eq!(file.load().expect("load"), entries(&["X"]));
    // The remote set is untouched by the failed push.
    assert_eq!(mock.state.favorites(), entries(&["Y"]));
}

#[tokio::test]
async fn signed_in_favorite_changes_reach_the_account() {
    let mock = MockApi::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), Some(SessionToken::new(TEST_TOKEN))))
        .expect("engine");

    engine.favorites().add(ProductId::new("X"));
    engine.favorites().add(ProductId::new("Z"));
    engine.favorites().remove(&ProductId::new("X"));
    engine.drain_pending().await;

    assert_eq!(mock.state.favorites(), entries(&["Z"]));
    assert_eq!(mock.state.hit_count("favorites_add"), 2);
    assert_eq!(mock.state.hit_count("favorites_remove"), 1);
}

#[tokio::test]
async fn signed_in_changes_do_not_write_the_durable_store() {
    let mock = MockApi::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), Some(SessionToken::new(TEST_TOKEN))))
        .expect("engine");

    engine.favorites().add(ProductId::new("X"));
    engine.drain_pending().await;

    // The durable file belongs to anonymous mode only.
    let file = FavoritesFile::new(dir.path());
    assert!(file.load().expect("load").is_empty());
}
