/// Per-track descriptors attached to a download request
use serde::{Deserialize, Serialize};

/// Identifying fields for one track of a requested album or playlist.
///
/// Stored as an ordered JSON array on the owning request; the store never
/// interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// International Standard Recording Code, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
}

impl TrackMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}
