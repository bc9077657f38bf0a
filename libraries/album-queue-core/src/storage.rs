//! Storage trait for the request queue

use crate::context::OpContext;
use crate::error::{QueueError, Result};
use crate::types::{
    CreatorId, DownloadQueueRequest, MusicFile, NewDownloadRequest, NewPlaylistRequest,
    PlaylistRequest, RequestId,
};
use async_trait::async_trait;

/// Persistence contract for download requests, playlist requests and the
/// music catalog.
///
/// Implementations are dumb persistence layers: they enforce only structural
/// constraints (non-empty URL, known creator, equal-length lookup lists) and
/// single-record atomicity. Lifecycle policy lives in
/// [`RequestLifecycle`](crate::lifecycle::RequestLifecycle).
///
/// Every operation must honour `ctx`: a cancelled or expired context aborts
/// the call with `Cancelled`/`TimedOut`.
#[async_trait]
pub trait RequestStore: Send + Sync {
    // ========================================================================
    // Download requests
    // ========================================================================

    /// Persist a new active download request and return its fresh id
    async fn submit_download_request(
        &self,
        ctx: &OpContext,
        request: NewDownloadRequest,
    ) -> Result<RequestId>;

    /// All requests with `active == true`, oldest first
    async fn list_active_download_requests(
        &self,
        ctx: &OpContext,
    ) -> Result<Vec<DownloadQueueRequest>>;

    /// Re-read a single request regardless of its active state
    async fn get_download_request(
        &self,
        ctx: &OpContext,
        id: &RequestId,
    ) -> Result<DownloadQueueRequest>;

    /// Mark a request inactive.
    ///
    /// Deactivating an already-inactive request succeeds without touching it;
    /// a missing id is `NotFound`.
    async fn deactivate_download_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()>;

    /// Overwrite the mutable fields of an active request, keyed by `record.id`.
    ///
    /// Applied atomically only while the stored record is still active, so a
    /// deactivated request can never be changed or reactivated. Returns
    /// `RequestInactive` for a deactivated record and `NotFound` for an
    /// unknown id; neither case touches the store.
    async fn update_download_request(
        &self,
        ctx: &OpContext,
        record: &DownloadQueueRequest,
    ) -> Result<()>;

    // ========================================================================
    // Playlist requests
    // ========================================================================

    async fn submit_playlist_request(
        &self,
        ctx: &OpContext,
        request: NewPlaylistRequest,
    ) -> Result<RequestId>;

    async fn list_active_playlist_requests(&self, ctx: &OpContext)
        -> Result<Vec<PlaylistRequest>>;

    async fn deactivate_playlist_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()>;

    // ========================================================================
    // Music catalog
    // ========================================================================

    /// Catalog entries matching any `(artists[i], titles[i])` pair exactly.
    ///
    /// Mismatched list lengths are rejected with `InvalidArgument` before any
    /// lookup.
    async fn find_music_files(
        &self,
        ctx: &OpContext,
        artists: &[String],
        titles: &[String],
    ) -> Result<Vec<MusicFile>>;

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Round-trip to the persistence layer, for liveness checks
    async fn ping(&self, ctx: &OpContext) -> Result<()>;

    /// Release the underlying connection. Further calls fail with
    /// `StorageUnavailable`.
    async fn close(&self);
}

/// Structural checks every backend applies before persisting a submission
pub fn check_submission(source_url: &str, creator_id: CreatorId) -> Result<()> {
    if source_url.trim().is_empty() {
        return Err(QueueError::invalid_argument("source URL must not be empty"));
    }

    if !creator_id.is_set() {
        return Err(QueueError::invalid_argument("creator id is required"));
    }

    Ok(())
}
