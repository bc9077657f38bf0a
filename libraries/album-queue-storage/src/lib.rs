//! Album Queue Storage
//!
//! `SQLite` persistence for the request queue.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each collection owns its own queries
//!   (`download_requests`, `playlist_requests`, `music_files`)
//! - **Store Adapter**: `SqliteRequestStore` implements the core
//!   `RequestStore` trait on top of the slices, under the caller's `OpContext`
//!
//! # Example
//!
//! ```rust,no_run
//! use album_queue_core::{OpContext, RequestStore};
//! use album_queue_storage::SqliteRequestStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteRequestStore::connect("sqlite://album-queue.db", 5).await?;
//!
//! let active = store
//!     .list_active_download_requests(&OpContext::new())
//!     .await?;
//! println!("{} active requests", active.len());
//!
//! store.close().await;
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

// Vertical slices
pub mod download_requests;
pub mod music_files;
pub mod playlist_requests;

pub use error::StorageError;
pub use store::SqliteRequestStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Called once at startup to bring the schema up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://album-queue.db>`)
/// * `max_connections` - upper bound on pooled connections
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    debug!("SQLite pool created");

    Ok(pool)
}
