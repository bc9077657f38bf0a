//! In-memory [`RequestStore`] keyed by request id.
//!
//! Used as a test double and for running the bot without a database. Each
//! operation holds the map lock for its whole duration, which gives the same
//! single-record atomicity the SQLite backend gets from its statements.

use crate::context::OpContext;
use crate::error::{QueueError, Result};
use crate::storage::{check_submission, RequestStore};
use crate::types::{
    now_timestamp, DownloadQueueRequest, MusicFile, NewDownloadRequest, NewMusicFile,
    NewPlaylistRequest, PlaylistRequest, RequestId, TrackKeys,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const DOWNLOAD_REQUEST: &str = "DownloadQueueRequest";
const PLAYLIST_REQUEST: &str = "PlaylistRequest";

#[derive(Default)]
struct Inner {
    downloads: HashMap<RequestId, DownloadQueueRequest>,
    playlists: HashMap<RequestId, PlaylistRequest>,
    // The payload is kept to mirror the persistent layout but never returned
    music_files: Vec<(MusicFile, Option<serde_json::Value>)>,
    closed: bool,
}

impl Inner {
    fn fresh_id(&self) -> RequestId {
        loop {
            let id = RequestId::generate();
            if !self.downloads.contains_key(&id) && !self.playlists.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Store backed by process memory
#[derive(Default)]
pub struct InMemoryRequestStore {
    inner: Mutex<Inner>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the music catalog
    pub fn add_music_file(&self, file: NewMusicFile) -> Result<MusicFile> {
        let mut inner = self.lock("add_music_file")?;

        let entry = MusicFile {
            id: RequestId::generate().to_string(),
            artist: file.artist,
            title: file.title,
            album: file.album,
            path: file.path,
            created_at: now_timestamp(),
        };
        inner.music_files.push((entry.clone(), file.meta_data));

        Ok(entry)
    }

    /// Number of download requests ever submitted, active or not
    pub fn download_request_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.downloads.len())
            .unwrap_or_default()
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, Inner>> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| QueueError::storage_unavailable(operation, e))?;

        if inner.closed {
            return Err(QueueError::storage_unavailable(operation, "store is closed"));
        }

        Ok(inner)
    }

    fn overwrite(&self, operation: &str, record: &DownloadQueueRequest) -> Result<()> {
        let mut inner = self.lock(operation)?;

        let stored = inner
            .downloads
            .get_mut(&record.id)
            .ok_or_else(|| QueueError::not_found(DOWNLOAD_REQUEST, record.id.as_str()))?;

        if !stored.active {
            return Err(QueueError::inactive(record.id.as_str()));
        }

        stored.expected_track_count = record.expected_track_count;
        stored.found_track_count = record.found_track_count;
        stored.track_metadata.clone_from(&record.track_metadata);
        stored.name.clone_from(&record.name);
        stored.active = record.active;
        stored.updated_at = record.updated_at;
        stored.sync_count = record.sync_count;
        stored.retry_count = record.retry_count;
        stored.errored = record.errored;

        Ok(())
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn submit_download_request(
        &self,
        ctx: &OpContext,
        request: NewDownloadRequest,
    ) -> Result<RequestId> {
        ctx.check("submit_download_request")?;
        check_submission(&request.source_url, request.creator_id)?;

        let mut inner = self.lock("submit_download_request")?;
        let id = inner.fresh_id();
        let record = DownloadQueueRequest::submitted(id.clone(), request, now_timestamp());
        inner.downloads.insert(id.clone(), record);

        Ok(id)
    }

    async fn list_active_download_requests(
        &self,
        ctx: &OpContext,
    ) -> Result<Vec<DownloadQueueRequest>> {
        ctx.check("list_active_download_requests")?;
        let inner = self.lock("list_active_download_requests")?;

        let mut active: Vec<_> = inner
            .downloads
            .values()
            .filter(|r| r.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(active)
    }

    async fn get_download_request(
        &self,
        ctx: &OpContext,
        id: &RequestId,
    ) -> Result<DownloadQueueRequest> {
        ctx.check("get_download_request")?;
        let inner = self.lock("get_download_request")?;

        inner
            .downloads
            .get(id)
            .cloned()
            .ok_or_else(|| QueueError::not_found(DOWNLOAD_REQUEST, id.as_str()))
    }

    async fn deactivate_download_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        ctx.check("deactivate_download_request")?;
        let mut inner = self.lock("deactivate_download_request")?;

        let stored = inner
            .downloads
            .get_mut(id)
            .ok_or_else(|| QueueError::not_found(DOWNLOAD_REQUEST, id.as_str()))?;

        if stored.active {
            stored.active = false;
            stored.updated_at = now_timestamp();
        }

        Ok(())
    }

    async fn update_download_request(
        &self,
        ctx: &OpContext,
        record: &DownloadQueueRequest,
    ) -> Result<()> {
        ctx.check("update_download_request")?;
        self.overwrite("update_download_request", record)
    }

    async fn submit_playlist_request(
        &self,
        ctx: &OpContext,
        request: NewPlaylistRequest,
    ) -> Result<RequestId> {
        ctx.check("submit_playlist_request")?;
        check_submission(&request.source_url, request.creator_id)?;

        let mut inner = self.lock("submit_playlist_request")?;
        let id = inner.fresh_id();
        let record = PlaylistRequest::submitted(id.clone(), request, now_timestamp());
        inner.playlists.insert(id.clone(), record);

        Ok(id)
    }

    async fn list_active_playlist_requests(
        &self,
        ctx: &OpContext,
    ) -> Result<Vec<PlaylistRequest>> {
        ctx.check("list_active_playlist_requests")?;
        let inner = self.lock("list_active_playlist_requests")?;

        let mut active: Vec<_> = inner
            .playlists
            .values()
            .filter(|r| r.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(active)
    }

    async fn deactivate_playlist_request(&self, ctx: &OpContext, id: &RequestId) -> Result<()> {
        ctx.check("deactivate_playlist_request")?;
        let mut inner = self.lock("deactivate_playlist_request")?;

        let stored = inner
            .playlists
            .get_mut(id)
            .ok_or_else(|| QueueError::not_found(PLAYLIST_REQUEST, id.as_str()))?;

        if stored.active {
            stored.active = false;
            stored.updated_at = now_timestamp();
        }

        Ok(())
    }

    async fn find_music_files(
        &self,
        ctx: &OpContext,
        artists: &[String],
        titles: &[String],
    ) -> Result<Vec<MusicFile>> {
        let keys = TrackKeys::zip(artists, titles).ok_or_else(|| {
            QueueError::invalid_argument("artists and titles must have the same length")
        })?;
        ctx.check("find_music_files")?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.lock("find_music_files")?;
        Ok(inner
            .music_files
            .iter()
            .filter(|(file, _)| keys.matches(&file.artist, &file.title))
            .map(|(file, _)| file.clone())
            .collect())
    }

    async fn ping(&self, ctx: &OpContext) -> Result<()> {
        ctx.check("ping")?;
        self.lock("ping").map(|_| ())
    }

    async fn close(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.closed = true;
        }
    }
}
