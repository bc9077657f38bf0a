/// Catalog entries used for existence checks
use serde::{Deserialize, Serialize};

/// A file already present in the music catalog.
///
/// Lookups project out the stored metadata payload, so this type has no
/// field for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicFile {
    pub id: String,
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub path: String,
    pub created_at: i64,
}

/// Input for registering a catalog entry, including its metadata payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMusicFile {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub path: String,
    pub meta_data: Option<serde_json::Value>,
}

impl NewMusicFile {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            path: path.into(),
            meta_data: None,
        }
    }
}

/// Equal-length artist/title lists zipped into lookup pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackKeys {
    pairs: Vec<(String, String)>,
}

impl TrackKeys {
    /// Zip parallel artist and title lists.
    ///
    /// Returns `None` when the lengths differ.
    pub fn zip(artists: &[String], titles: &[String]) -> Option<Self> {
        if artists.len() != titles.len() {
            return None;
        }

        Some(Self {
            pairs: artists.iter().cloned().zip(titles.iter().cloned()).collect(),
        })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn matches(&self, artist: &str, title: &str) -> bool {
        self.pairs.iter().any(|(a, t)| a == artist && t == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_zip_rejects_mismatched_lengths() {
        assert!(TrackKeys::zip(&strings(&["a", "b"]), &strings(&["t"])).is_none());
    }

    #[test]
    fn test_matches_is_exact_per_field() {
        let keys = TrackKeys::zip(&strings(&["Daft Punk"]), &strings(&["One More Time"])).unwrap();
        assert!(keys.matches("Daft Punk", "One More Time"));
        assert!(!keys.matches("daft punk", "One More Time"));
        assert!(!keys.matches("Daft Punk", "Aerodynamic"));
    }
}
