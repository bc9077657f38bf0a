use crate::error::StorageError;
use crate::{download_requests, music_files, playlist_requests};
use album_queue_core::storage::check_submission;
use album_queue_core::{
    DownloadQueueRequest, MusicFile, NewDownloadRequest, NewPlaylistRequest, OpContext,
    PlaylistRequest, QueueError, RequestId, RequestStore, Result,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::future::Future;
use tracing::info;

/// [`RequestStore`] backed by a `SQLite` pool.
///
/// The pool is the process-wide connection; it is handed in at construction
/// and released by [`RequestStore::close`].
pub struct SqliteRequestStore {
    pool: SqlitePool,
}

impl SqliteRequestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the pool, apply migrations and verify the connection
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> std::result::Result<Self, StorageError> {
        if database_url.trim().is_empty() {
            return Err(StorageError::Connection(
                "database URL must not be empty".to_string(),
            ));
        }

        let pool = crate::create_pool(database_url, max_connections).await?;
        crate::run_migrations(&pool).await?;
        sqlx::query("SELECT 1").execute(&pool).await?;

        info!("Database connection established");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Run a slice call under `ctx`, mapping storage errors into the queue taxonomy
async fn run<T, F>(ctx: &OpContext, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, StorageError>>,
{
    ctx.run(operation, async move {
        fut.await.map_err(|e| e.into_queue_error(operation))
    })
    .await
}

#[async_trait]
impl RequestStore for SqliteRequestStore {
    async fn submit_download_request(
        &self,
        ctx: &OpContext,
        request: NewDownloadRequest,
    ) -> Result<RequestId> {
        check_submission(&request.source_url, request.creator_id)?;
        run(
            ctx,
            "submit_download_request",
            download_requests::create(&self.pool, request),
        )
        .await
    }

    async fn list_active_download_requests(
        &self,
        ctx: &OpContext,
    ) -> Result<Vec<DownloadQueueRequest>> {
        run(
            ctx,
            "list_active_download_requests",
            download_requests::get_active(&self.pool),
        )
        .await
    }

    async fn get_download_request(
        &self,
        ctx: &OpContext,
        id: &RequestId,
    ) -> Result<DownloadQueueRequest> {
        run(
            ctx,
            "get_download_request",
            download_requests::get_by_id(&self.pool, id),
        )
        .await?
        .ok_or_else(|| QueueError::not_found("DownloadQueueRequest", id.as_str()))
    }

    async fn deactivate_download_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        run(
            ctx,
            "deactivate_download_request",
            download_requests::deactivate(&self.pool, id),
        )
        .await
    }

    async fn update_download_request(
        &self,
        ctx: &OpContext,
        record: &DownloadQueueRequest,
    ) -> Result<()> {
        run(
            ctx,
            "update_download_request",
            download_requests::update(&self.pool, record),
        )
        .await
    }

    async fn submit_playlist_request(
        &self,
        ctx: &OpContext,
        request: NewPlaylistRequest,
    ) -> Result<RequestId> {
        check_submission(&request.source_url, request.creator_id)?;
        run(
            ctx,
            "submit_playlist_request",
            playlist_requests::create(&self.pool, request),
        )
        .await
    }

    async fn list_active_playlist_requests(
        &self,
        ctx: &OpContext,
    ) -> Result<Vec<PlaylistRequest>> {
        run(
            ctx,
            "list_active_playlist_requests",
            playlist_requests::get_active(&self.pool),
        )
        .await
    }

    async fn deactivate_playlist_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        run(
            ctx,
            "deactivate_playlist_request",
            playlist_requests::deactivate(&self.pool, id),
        )
        .await
    }

    async fn find_music_files(
        &self,
        ctx: &OpContext,
        artists: &[String],
        titles: &[String],
    ) -> Result<Vec<MusicFile>> {
        if artists.len() != titles.len() {
            return Err(QueueError::invalid_argument(
                "artists and titles must have the same length",
            ));
        }

        run(
            ctx,
            "find_music_files",
            music_files::find(&self.pool, artists, titles),
        )
        .await
    }

    async fn ping(&self, ctx: &OpContext) -> Result<()> {
        run(ctx, "ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok::<_, StorageError>(())
        })
        .await
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}
