//! Store-level behaviour: connection lifecycle, cancellation and the
//! lifecycle rules running over the SQLite backend.

mod test_helpers;

use album_queue_core::{ErrorKind, OpContext, RequestLifecycle, RequestStore};
use album_queue_storage::SqliteRequestStore;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;

#[tokio::test]
async fn test_connect_applies_migrations() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", temp_dir.path().join("queue.db").display());

    let store = SqliteRequestStore::connect(&url, 2)
        .await
        .expect("Failed to connect");
    store.ping(&ctx()).await.unwrap();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();
    assert_eq!(store.get_download_request(&ctx(), &id).await.unwrap().id, id);

    store.close().await;
}

#[tokio::test]
async fn test_connect_rejects_empty_url() {
    assert!(SqliteRequestStore::connect("  ", 1).await.is_err());
}

#[tokio::test]
async fn test_closed_store_is_unavailable() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    store.close().await;

    let err = store.ping(&ctx()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

    let err = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
}

#[tokio::test]
async fn test_cancelled_context_aborts_operation() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let cancelled = OpContext::new();
    cancelled.cancel();

    let err = store
        .submit_download_request(&cancelled, test_album())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    assert!(store
        .list_active_download_requests(&ctx())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_expired_context_times_out() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let expired = OpContext::new().with_timeout(Duration::ZERO);
    let err = store.ping(&expired).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimedOut);
}

#[tokio::test]
async fn test_lifecycle_over_sqlite() {
    let test_db = TestDb::new().await;
    let lifecycle = RequestLifecycle::new(Arc::new(test_db.store()));
    let ctx = ctx();

    let id = lifecycle.submit_download(&ctx, test_album()).await.unwrap();

    let progressed = lifecycle.record_progress(&ctx, &id, 4, true).await.unwrap();
    assert_eq!(progressed.found_track_count, 4);
    assert_eq!(progressed.retry_count, 1);

    let clamped = lifecycle.record_progress(&ctx, &id, 15, false).await.unwrap();
    assert_eq!(clamped.found_track_count, 10);
    assert_eq!(lifecycle.get(&ctx, &id).await.unwrap(), clamped);

    lifecycle.deactivate(&ctx, &id).await.unwrap();
    let err = lifecycle
        .record_progress(&ctx, &id, 10, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInactive);
    assert!(lifecycle.list_active(&ctx).await.unwrap().is_empty());
}
