//! Download request storage
//!
//! Each write is a single statement, so a create, update or deactivate on
//! one id is all-or-nothing without any in-process locking.
//!
//! # Example
//!
//! ```rust,no_run
//! use album_queue_core::{CreatorId, NewDownloadRequest};
//! use album_queue_storage::download_requests;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let id = download_requests::create(
//!     pool,
//!     NewDownloadRequest::new("https://open.spotify.com/album/X", CreatorId::new(42)),
//! )
//! .await?;
//!
//! for request in download_requests::get_active(pool).await? {
//!     println!("{}: {}", request.id, request.name);
//! }
//!
//! download_requests::deactivate(pool, &id).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StorageError};
use album_queue_core::types::now_timestamp;
use album_queue_core::{
    CreatorId, DownloadQueueRequest, NewDownloadRequest, RequestId, TrackMetadata,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const ENTITY: &str = "DownloadQueueRequest";

const SELECT_COLUMNS: &str = "SELECT id, source_url, name, active, created_at, updated_at, \
     creator_id, expected_track_count, found_track_count, track_metadata, \
     sync_count, retry_count, errored \
     FROM download_queue_requests";

/// Persist a new active request and return its generated id
pub async fn create(pool: &SqlitePool, request: NewDownloadRequest) -> Result<RequestId> {
    let id = RequestId::generate();
    let record = DownloadQueueRequest::submitted(id.clone(), request, now_timestamp());
    insert(pool, &record).await?;

    debug!(request_id = %id, "Inserted download request");
    Ok(id)
}

/// Insert a fully-formed record
pub async fn insert(pool: &SqlitePool, record: &DownloadQueueRequest) -> Result<()> {
    let track_metadata = serde_json::to_string(&record.track_metadata)?;

    sqlx::query(
        "INSERT INTO download_queue_requests (
            id, source_url, name, active, created_at, updated_at, creator_id,
            expected_track_count, found_track_count, track_metadata,
            sync_count, retry_count, errored
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id.as_str())
    .bind(&record.source_url)
    .bind(&record.name)
    .bind(record.active)
    .bind(record.created_at)
    .bind(record.updated_at)
    .bind(record.creator_id.get())
    .bind(i64::from(record.expected_track_count))
    .bind(i64::from(record.found_track_count))
    .bind(track_metadata)
    .bind(i64::from(record.sync_count))
    .bind(i64::from(record.retry_count))
    .bind(record.errored)
    .execute(pool)
    .await?;

    Ok(())
}

/// All active requests, oldest first
pub async fn get_active(pool: &SqlitePool) -> Result<Vec<DownloadQueueRequest>> {
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE active = 1 ORDER BY created_at ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: &RequestId) -> Result<Option<DownloadQueueRequest>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn exists(pool: &SqlitePool, id: &RequestId) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM download_queue_requests WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

/// Mark a request inactive.
///
/// An already-inactive request matches but keeps its `updated_at`.
pub async fn deactivate(pool: &SqlitePool, id: &RequestId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE download_queue_requests
         SET updated_at = CASE WHEN active = 1 THEN ? ELSE updated_at END,
             active = 0
         WHERE id = ?",
    )
    .bind(now_timestamp())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found(ENTITY, id.as_str()));
    }

    Ok(())
}

/// Overwrite the mutable fields of a request while it is still active.
///
/// The write is a single conditional statement, so a request deactivated
/// concurrently is never changed or reactivated.
pub async fn update(pool: &SqlitePool, record: &DownloadQueueRequest) -> Result<()> {
    let track_metadata = serde_json::to_string(&record.track_metadata)?;

    let result = sqlx::query(
        "UPDATE download_queue_requests
         SET expected_track_count = ?, found_track_count = ?, track_metadata = ?,
             name = ?, active = ?, updated_at = ?,
             sync_count = ?, retry_count = ?, errored = ?
         WHERE id = ? AND active = 1",
    )
    .bind(i64::from(record.expected_track_count))
    .bind(i64::from(record.found_track_count))
    .bind(track_metadata)
    .bind(&record.name)
    .bind(record.active)
    .bind(record.updated_at)
    .bind(i64::from(record.sync_count))
    .bind(i64::from(record.retry_count))
    .bind(record.errored)
    .bind(record.id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Nothing was written; the existence check only tells a missing id from an
        // inactive one
        if exists(pool, &record.id).await? {
            return Err(StorageError::inactive(ENTITY, record.id.as_str()));
        }
        return Err(StorageError::not_found(ENTITY, record.id.as_str()));
    }

    Ok(())
}

fn from_row(row: &SqliteRow) -> Result<DownloadQueueRequest> {
    let id: String = row.try_get("id")?;
    let decode = |reason: String| StorageError::decode(ENTITY, id.as_str(), reason);

    let count = |column: &str| -> Result<u32> {
        let value: i64 = row.try_get(column).map_err(|e| decode(e.to_string()))?;
        u32::try_from(value).map_err(|_| decode(format!("{column} out of range: {value}")))
    };

    let metadata_json: String = row
        .try_get("track_metadata")
        .map_err(|e| decode(e.to_string()))?;
    let track_metadata: Vec<TrackMetadata> = serde_json::from_str(&metadata_json)
        .map_err(|e| decode(format!("track_metadata: {e}")))?;

    Ok(DownloadQueueRequest {
        source_url: row.try_get("source_url").map_err(|e| decode(e.to_string()))?,
        name: row.try_get("name").map_err(|e| decode(e.to_string()))?,
        active: row.try_get("active").map_err(|e| decode(e.to_string()))?,
        created_at: row.try_get("created_at").map_err(|e| decode(e.to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|e| decode(e.to_string()))?,
        creator_id: CreatorId::new(
            row.try_get("creator_id")
                .map_err(|e| decode(e.to_string()))?,
        ),
        expected_track_count: count("expected_track_count")?,
        found_track_count: count("found_track_count")?,
        track_metadata,
        sync_count: count("sync_count")?,
        retry_count: count("retry_count")?,
        errored: row.try_get("errored").map_err(|e| decode(e.to_string()))?,
        id: RequestId::new(id.clone()),
    })
}
