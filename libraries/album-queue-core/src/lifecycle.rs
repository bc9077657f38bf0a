//! Request lifecycle rules.
//!
//! [`RequestLifecycle`] is the only entry point front ends and workers use to
//! touch the queue. It keeps the store a plain persistence layer while
//! enforcing the transitions that make a request's history trustworthy:
//!
//! - ids are only produced by the submission operations;
//! - deactivation is terminal, and nothing mutates an inactive request;
//! - `found_track_count` never decreases and never exceeds a known
//!   `expected_track_count` (excess is clamped);
//! - `updated_at` is refreshed on every accepted mutation.

use crate::context::OpContext;
use crate::error::{QueueError, Result};
use crate::storage::RequestStore;
use crate::types::{
    now_timestamp, DownloadQueueRequest, MusicFile, NewDownloadRequest, NewPlaylistRequest,
    PlaylistRequest, RequestId,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Policy layer over a [`RequestStore`]
#[derive(Clone)]
pub struct RequestLifecycle {
    store: Arc<dyn RequestStore>,
}

impl RequestLifecycle {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RequestStore> {
        &self.store
    }

    pub async fn submit_download(
        &self,
        ctx: &OpContext,
        mut request: NewDownloadRequest,
    ) -> Result<RequestId> {
        request.source_url = request.source_url.trim().to_string();
        request.name = request.name.trim().to_string();

        let creator_id = request.creator_id;
        let id = self.store.submit_download_request(ctx, request).await?;
        info!(request_id = %id, creator_id = %creator_id, "Download request submitted");

        Ok(id)
    }

    pub async fn submit_playlist(
        &self,
        ctx: &OpContext,
        mut request: NewPlaylistRequest,
    ) -> Result<RequestId> {
        request.source_url = request.source_url.trim().to_string();

        let creator_id = request.creator_id;
        let no_pull = request.no_pull;
        let id = self.store.submit_playlist_request(ctx, request).await?;
        info!(request_id = %id, creator_id = %creator_id, no_pull, "Playlist request submitted");

        Ok(id)
    }

    pub async fn list_active(&self, ctx: &OpContext) -> Result<Vec<DownloadQueueRequest>> {
        self.store.list_active_download_requests(ctx).await
    }

    pub async fn list_active_playlists(&self, ctx: &OpContext) -> Result<Vec<PlaylistRequest>> {
        self.store.list_active_playlist_requests(ctx).await
    }

    pub async fn get(&self, ctx: &OpContext, id: &RequestId) -> Result<DownloadQueueRequest> {
        self.store.get_download_request(ctx, id).await
    }

    pub async fn deactivate(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        self.store.deactivate_download_request(ctx, id).await?;
        info!(request_id = %id, "Download request deactivated");
        Ok(())
    }

    pub async fn deactivate_playlist(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        self.store.deactivate_playlist_request(ctx, id).await?;
        info!(request_id = %id, "Playlist request deactivated");
        Ok(())
    }

    pub async fn find_music_files(
        &self,
        ctx: &OpContext,
        artists: &[String],
        titles: &[String],
    ) -> Result<Vec<MusicFile>> {
        self.store.find_music_files(ctx, artists, titles).await
    }

    /// Apply a worker's read-modify-write of a download request.
    ///
    /// Returns the record as persisted (clamped, timestamps refreshed).
    pub async fn update(
        &self,
        ctx: &OpContext,
        record: DownloadQueueRequest,
    ) -> Result<DownloadQueueRequest> {
        let current = self.store.get_download_request(ctx, &record.id).await?;
        let next = apply_update(&current, record, now_timestamp())?;

        // The store refuses inactive records, so a racing deactivation wins
        self.store.update_download_request(ctx, &next).await?;

        Ok(next)
    }

    /// Record one reconciliation attempt by the external worker
    pub async fn record_progress(
        &self,
        ctx: &OpContext,
        id: &RequestId,
        found_track_count: u32,
        errored: bool,
    ) -> Result<DownloadQueueRequest> {
        let mut record = self.store.get_download_request(ctx, id).await?;

        record.found_track_count = found_track_count;
        record.sync_count = record.sync_count.saturating_add(1);
        if errored {
            record.retry_count = record.retry_count.saturating_add(1);
        }
        record.errored = errored;

        self.update(ctx, record).await
    }
}

/// Validate and normalise a proposed new state of `current`
pub fn apply_update(
    current: &DownloadQueueRequest,
    mut next: DownloadQueueRequest,
    now: i64,
) -> Result<DownloadQueueRequest> {
    if !current.active {
        return Err(QueueError::inactive(current.id.as_str()));
    }

    // Immutable after creation
    next.source_url.clone_from(&current.source_url);
    next.creator_id = current.creator_id;
    next.created_at = current.created_at;

    if next.expected_track_count > 0 && next.found_track_count > next.expected_track_count {
        warn!(
            request_id = %current.id,
            found = next.found_track_count,
            expected = next.expected_track_count,
            "Found track count exceeds expected count, clamping"
        );
        next.found_track_count = next.expected_track_count;
    }

    if next.found_track_count < current.found_track_count {
        return Err(QueueError::invalid_argument(format!(
            "found track count for {} cannot decrease from {} to {}",
            current.id, current.found_track_count, next.found_track_count
        )));
    }

    next.updated_at = now.max(current.updated_at);

    Ok(next)
}
