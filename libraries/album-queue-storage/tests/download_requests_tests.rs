//! Integration tests for the download requests slice
//!
//! Covers:
//! - Submission and visibility in the active list
//! - Deactivation semantics (terminal, idempotent, NotFound)
//! - Full-record updates and the conditional active-only update
//! - Decode failures surfacing instead of dropping rows

mod test_helpers;

use album_queue_core::{
    CreatorId, DownloadQueueRequest, ErrorKind, NewDownloadRequest, RequestId, RequestStore,
    TrackMetadata,
};
use album_queue_storage::download_requests;
use test_helpers::*;

#[tokio::test]
async fn test_submit_is_immediately_listed() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .expect("Failed to submit request");
    assert!(!id.as_str().is_empty());

    let active = store.list_active_download_requests(&ctx()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, id);
    assert_eq!(active[0].name, "Test Album");
    assert_eq!(active[0].source_url, ALBUM_URL);
    assert_eq!(active[0].creator_id, CreatorId::new(42));
    assert_eq!(active[0].expected_track_count, 10);
    assert_eq!(active[0].found_track_count, 0);
    assert!(active[0].active);
    assert!(active[0].track_metadata.is_empty());
}

#[tokio::test]
async fn test_submit_rejects_missing_creator() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let err = store
        .submit_download_request(&ctx(), NewDownloadRequest::new(ALBUM_URL, CreatorId::new(0)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(store
        .list_active_download_requests(&ctx())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deactivate_then_list_is_empty() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();
    store.deactivate_download_request(&ctx(), &id).await.unwrap();

    assert!(store
        .list_active_download_requests(&ctx())
        .await
        .unwrap()
        .is_empty());

    let stored = store.get_download_request(&ctx(), &id).await.unwrap();
    assert!(!stored.active);
}

#[tokio::test]
async fn test_deactivate_unknown_id() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let kept = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();

    let err = store
        .deactivate_download_request(&ctx(), &RequestId::new("nonexistent"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let active = store.list_active_download_requests(&ctx()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept);
}

#[tokio::test]
async fn test_deactivate_twice_keeps_first_timestamp() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let mut record = DownloadQueueRequest::submitted(RequestId::generate(), test_album(), 1_000);
    record.active = false;
    download_requests::insert(pool, &record).await.unwrap();

    download_requests::deactivate(pool, &record.id)
        .await
        .expect("Deactivating an inactive request should succeed");

    let stored = download_requests::get_by_id(pool, &record.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.active);
    assert_eq!(stored.updated_at, 1_000);
}

#[tokio::test]
async fn test_update_unknown_id_leaves_store_unchanged() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();
    let before = store.get_download_request(&ctx(), &id).await.unwrap();

    let mut ghost = before.clone();
    ghost.id = RequestId::new("ghost");
    ghost.name = "Renamed".to_string();
    ghost.found_track_count = 3;

    let err = store
        .update_download_request(&ctx(), &ghost)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let after = store.get_download_request(&ctx(), &id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_update_overwrites_mutable_fields() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();

    let mut record = store.get_download_request(&ctx(), &id).await.unwrap();
    record.name = "Resolved Name".to_string();
    record.found_track_count = 4;
    record.track_metadata = vec![
        TrackMetadata::new("Artist", "Intro"),
        TrackMetadata {
            album: Some("Test Album".to_string()),
            track_number: Some(2),
            ..TrackMetadata::new("Artist", "Second")
        },
    ];
    record.sync_count = 3;
    record.retry_count = 1;
    record.errored = true;
    record.updated_at += 5;

    store.update_download_request(&ctx(), &record).await.unwrap();

    let stored = store.get_download_request(&ctx(), &id).await.unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn test_update_does_not_touch_immutable_columns() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();

    let mut record = store.get_download_request(&ctx(), &id).await.unwrap();
    let original_url = record.source_url.clone();
    record.source_url = "https://example.com/elsewhere".to_string();
    record.creator_id = CreatorId::new(7);

    store.update_download_request(&ctx(), &record).await.unwrap();

    let stored = store.get_download_request(&ctx(), &id).await.unwrap();
    assert_eq!(stored.source_url, original_url);
    assert_eq!(stored.creator_id, CreatorId::new(42));
}

#[tokio::test]
async fn test_update_cannot_reactivate_deactivated_request() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();
    let mut record = store.get_download_request(&ctx(), &id).await.unwrap();
    store.deactivate_download_request(&ctx(), &id).await.unwrap();
    let deactivated = store.get_download_request(&ctx(), &id).await.unwrap();

    record.active = true;
    record.name = "Renamed after deactivation".to_string();
    record.found_track_count = 9;
    let err = store
        .update_download_request(&ctx(), &record)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInactive);

    let stored = store.get_download_request(&ctx(), &id).await.unwrap();
    assert_eq!(stored, deactivated);
    assert!(store
        .list_active_download_requests(&ctx())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_update_can_deactivate_active_request() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    let id = store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();
    let mut record = store.get_download_request(&ctx(), &id).await.unwrap();
    record.active = false;
    record.found_track_count = 10;

    store.update_download_request(&ctx(), &record).await.unwrap();

    record.active = true;
    let err = store
        .update_download_request(&ctx(), &record)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInactive);
    assert!(!store.get_download_request(&ctx(), &id).await.unwrap().active);
}

#[tokio::test]
async fn test_active_list_is_oldest_first() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    for (name, created_at) in [("second", 200), ("first", 100), ("third", 300)] {
        let request = NewDownloadRequest::new(ALBUM_URL, CreatorId::new(1)).with_name(name);
        let record = DownloadQueueRequest::submitted(RequestId::generate(), request, created_at);
        download_requests::insert(pool, &record).await.unwrap();
    }

    let names: Vec<_> = download_requests::get_active(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_corrupt_row_is_reported_not_skipped() {
    let test_db = TestDb::new().await;
    let store = test_db.store();

    store
        .submit_download_request(&ctx(), test_album())
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO download_queue_requests
            (id, source_url, name, active, created_at, updated_at, creator_id, track_metadata)
         VALUES ('broken', ?, 'Broken', 1, 1, 1, 42, 'not json')",
    )
    .bind(ALBUM_URL)
    .execute(test_db.pool())
    .await
    .unwrap();

    let err = store
        .list_active_download_requests(&ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    assert!(err.to_string().contains("broken"));
}

#[tokio::test]
async fn test_concurrent_submissions_get_unique_ids() {
    let test_db = TestDb::new().await;
    let store = std::sync::Arc::new(test_db.store());

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let request = NewDownloadRequest::new(ALBUM_URL, CreatorId::new(i + 1));
            store.submit_download_request(&ctx(), request).await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(
        store.list_active_download_requests(&ctx()).await.unwrap().len(),
        20
    );
}
