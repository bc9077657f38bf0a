/// Download request domain types
use super::{CreatorId, RequestId, TrackMetadata};
use serde::{Deserialize, Serialize};

/// One user-submitted request to fetch an album or track from a source URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadQueueRequest {
    /// Unique identifier, generated at submission
    pub id: RequestId,

    /// External resource to fetch; immutable after creation
    pub source_url: String,

    /// Display name; may be empty until resolved
    pub name: String,

    /// True until the request is deactivated
    pub active: bool,

    /// Seconds since epoch
    pub created_at: i64,

    /// Seconds since epoch, refreshed on every mutation
    pub updated_at: i64,

    pub creator_id: CreatorId,

    /// Zero when unknown
    pub expected_track_count: u32,

    pub found_track_count: u32,

    pub track_metadata: Vec<TrackMetadata>,

    // Consumer bookkeeping, persisted as-is
    pub sync_count: u32,
    pub retry_count: u32,
    pub errored: bool,
}

impl DownloadQueueRequest {
    /// Build a freshly submitted, active request
    pub fn submitted(id: RequestId, new: NewDownloadRequest, now: i64) -> Self {
        Self {
            id,
            source_url: new.source_url,
            name: new.name,
            active: true,
            created_at: now,
            updated_at: now,
            creator_id: new.creator_id,
            expected_track_count: new.expected_track_count,
            found_track_count: 0,
            track_metadata: new.track_metadata,
            sync_count: 0,
            retry_count: 0,
            errored: false,
        }
    }

    /// All expected tracks have been located
    pub fn is_complete(&self) -> bool {
        self.expected_track_count > 0 && self.found_track_count >= self.expected_track_count
    }
}

/// Input for submitting a download request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDownloadRequest {
    pub source_url: String,
    pub name: String,
    pub creator_id: CreatorId,
    pub expected_track_count: u32,
    pub track_metadata: Vec<TrackMetadata>,
}

impl NewDownloadRequest {
    pub fn new(source_url: impl Into<String>, creator_id: CreatorId) -> Self {
        Self {
            source_url: source_url.into(),
            name: String::new(),
            creator_id,
            expected_track_count: 0,
            track_metadata: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_expected_track_count(mut self, count: u32) -> Self {
        self.expected_track_count = count;
        self
    }

    #[must_use]
    pub fn with_track_metadata(mut self, tracks: Vec<TrackMetadata>) -> Self {
        self.track_metadata = tracks;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_request_starts_active_and_empty() {
        let new = NewDownloadRequest::new("https://open.spotify.com/album/X", CreatorId::new(42))
            .with_name("Test Album")
            .with_expected_track_count(10);

        let request = DownloadQueueRequest::submitted(RequestId::new("id-1"), new, 1_700_000_000);

        assert!(request.active);
        assert_eq!(request.found_track_count, 0);
        assert_eq!(request.created_at, request.updated_at);
        assert_eq!(request.expected_track_count, 10);
        assert!(!request.is_complete());
    }

    #[test]
    fn test_is_complete_requires_known_expected_count() {
        let new = NewDownloadRequest::new("https://open.spotify.com/track/Y", CreatorId::new(1));
        let mut request = DownloadQueueRequest::submitted(RequestId::generate(), new, 0);

        request.found_track_count = 3;
        assert!(!request.is_complete());

        request.expected_track_count = 3;
        assert!(request.is_complete());
    }
}
