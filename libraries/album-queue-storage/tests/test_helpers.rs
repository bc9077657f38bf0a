//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! so migrations, constraints and indexes behave as in production.

#![allow(dead_code)]

use album_queue_core::{CreatorId, NewDownloadRequest, OpContext};
use album_queue_storage::SqliteRequestStore;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const ALBUM_URL: &str = "https://open.spotify.com/album/X";
pub const PLAYLIST_URL: &str = "https://open.spotify.com/playlist/P";

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = album_queue_storage::create_pool(&db_url, 5)
            .await
            .expect("Failed to create pool");

        album_queue_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store over this database's pool
    pub fn store(&self) -> SqliteRequestStore {
        SqliteRequestStore::new(self.pool.clone())
    }
}

pub fn ctx() -> OpContext {
    OpContext::new()
}

/// Test fixture: the album request used across scenarios
pub fn test_album() -> NewDownloadRequest {
    NewDownloadRequest::new(ALBUM_URL, CreatorId::new(42))
        .with_name("Test Album")
        .with_expected_track_count(10)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
