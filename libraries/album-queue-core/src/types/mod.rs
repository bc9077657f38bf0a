//! Domain types for the request queue

mod download_request;
mod ids;
mod music_file;
mod playlist_request;
mod track_metadata;

pub use download_request::{DownloadQueueRequest, NewDownloadRequest};
pub use ids::{CreatorId, RequestId};
pub use music_file::{MusicFile, NewMusicFile, TrackKeys};
pub use playlist_request::{NewPlaylistRequest, PlaylistRequest};
pub use track_metadata::TrackMetadata;

/// Current time as seconds since epoch
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
