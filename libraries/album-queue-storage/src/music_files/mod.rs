//! Music catalog lookups
//!
//! The catalog is populated out of band. Lookups never select the
//! `meta_data` payload column.

use crate::error::{Result, StorageError};
use album_queue_core::types::now_timestamp;
use album_queue_core::{MusicFile, NewMusicFile, RequestId, TrackKeys};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

const ENTITY: &str = "MusicFile";

/// Pairs per query; two bound parameters each keeps us well under
/// SQLite's variable limit.
const LOOKUP_CHUNK: usize = 400;

/// Register a catalog entry together with its metadata payload
pub async fn insert(pool: &SqlitePool, file: NewMusicFile) -> Result<MusicFile> {
    let meta_data = file
        .meta_data
        .as_ref()
        .map(serde_json::to_vec)
        .transpose()?;

    let entry = MusicFile {
        id: RequestId::generate().to_string(),
        artist: file.artist,
        title: file.title,
        album: file.album,
        path: file.path,
        created_at: now_timestamp(),
    };

    sqlx::query(
        "INSERT INTO music_files (id, artist, title, album, path, meta_data, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.artist)
    .bind(&entry.title)
    .bind(&entry.album)
    .bind(&entry.path)
    .bind(meta_data)
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(entry)
}

/// Entries matching any of the exact `(artist, title)` pairs
pub async fn find(
    pool: &SqlitePool,
    artists: &[String],
    titles: &[String],
) -> Result<Vec<MusicFile>> {
    let keys = TrackKeys::zip(artists, titles).ok_or_else(|| {
        StorageError::InvalidInput("artists and titles must have the same length".to_string())
    })?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for chunk in keys.pairs().chunks(LOOKUP_CHUNK) {
        let conditions = vec!["(artist = ? AND title = ?)"; chunk.len()];
        let query_str = format!(
            "SELECT id, artist, title, album, path, created_at
             FROM music_files
             WHERE {}
             ORDER BY artist, title, id",
            conditions.join(" OR ")
        );

        let mut query = sqlx::query(&query_str);
        for (artist, title) in chunk {
            query = query.bind(artist).bind(title);
        }

        let rows = query.fetch_all(pool).await?;
        for row in &rows {
            let file = from_row(row)?;
            if seen.insert(file.id.clone()) {
                files.push(file);
            }
        }
    }

    Ok(files)
}

fn from_row(row: &SqliteRow) -> Result<MusicFile> {
    let id: String = row.try_get("id")?;
    let decode = |e: sqlx::Error| StorageError::decode(ENTITY, id.as_str(), e);

    Ok(MusicFile {
        artist: row.try_get("artist").map_err(decode)?,
        title: row.try_get("title").map_err(decode)?,
        album: row.try_get("album").map_err(decode)?,
        path: row.try_get("path").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        id: id.clone(),
    })
}
