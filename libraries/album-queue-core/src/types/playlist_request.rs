/// Playlist import request domain types
use super::{CreatorId, RequestId};
use serde::{Deserialize, Serialize};

/// A request to import an entire playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRequest {
    pub id: RequestId,
    pub source_url: String,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator_id: CreatorId,

    /// Register playlist membership without enqueueing track downloads.
    /// Only the external worker interprets this flag.
    pub no_pull: bool,
}

impl PlaylistRequest {
    pub fn submitted(id: RequestId, new: NewPlaylistRequest, now: i64) -> Self {
        Self {
            id,
            source_url: new.source_url,
            active: true,
            created_at: now,
            updated_at: now,
            creator_id: new.creator_id,
            no_pull: new.no_pull,
        }
    }
}

/// Input for submitting a playlist request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlaylistRequest {
    pub source_url: String,
    pub creator_id: CreatorId,
    pub no_pull: bool,
}

impl NewPlaylistRequest {
    pub fn new(source_url: impl Into<String>, creator_id: CreatorId, no_pull: bool) -> Self {
        Self {
            source_url: source_url.into(),
            creator_id,
            no_pull,
        }
    }
}
