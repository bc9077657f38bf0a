//! Playlist request storage

use crate::error::{Result, StorageError};
use album_queue_core::types::now_timestamp;
use album_queue_core::{CreatorId, NewPlaylistRequest, PlaylistRequest, RequestId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const ENTITY: &str = "PlaylistRequest";

/// Persist a new active playlist request and return its generated id
pub async fn create(pool: &SqlitePool, request: NewPlaylistRequest) -> Result<RequestId> {
    let id = RequestId::generate();
    let record = PlaylistRequest::submitted(id.clone(), request, now_timestamp());

    sqlx::query(
        "INSERT INTO playlist_requests (id, source_url, active, created_at, updated_at, creator_id, no_pull)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id.as_str())
    .bind(&record.source_url)
    .bind(record.active)
    .bind(record.created_at)
    .bind(record.updated_at)
    .bind(record.creator_id.get())
    .bind(record.no_pull)
    .execute(pool)
    .await?;

    debug!(request_id = %id, no_pull = record.no_pull, "Inserted playlist request");
    Ok(id)
}

/// All active playlist requests, oldest first
pub async fn get_active(pool: &SqlitePool) -> Result<Vec<PlaylistRequest>> {
    let rows = sqlx::query(
        "SELECT id, source_url, active, created_at, updated_at, creator_id, no_pull
         FROM playlist_requests
         WHERE active = 1
         ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: &RequestId) -> Result<Option<PlaylistRequest>> {
    let row = sqlx::query(
        "SELECT id, source_url, active, created_at, updated_at, creator_id, no_pull
         FROM playlist_requests
         WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Mark a playlist request inactive; already-inactive requests are left as-is
pub async fn deactivate(pool: &SqlitePool, id: &RequestId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE playlist_requests
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

fn from_row(row: &SqliteRow) -> Result<PlaylistRequest> {
    let id: String = row.try_get("id")?;
    let decode = |e: sqlx::Error| StorageError::decode(ENTITY, id.as_str(), e);

    Ok(PlaylistRequest {
        source_url: row.try_get("source_url").map_err(decode)?,
        active: row.try_get("active").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
        creator_id: CreatorId::new(row.try_get("creator_id").map_err(decode)?),
        no_pull: row.try_get("no_pull").map_err(decode)?,
        id: RequestId::new(id.clone()),
    })
}
