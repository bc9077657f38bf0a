//! Display-name lookup for submitted links

use crate::error::{BotError, Result};
use async_trait::async_trait;

/// Only links under this prefix are accepted as sources
pub const SOURCE_URL_PREFIX: &str = "https://open.spotify.com/";

pub fn is_valid_source_url(url: &str) -> bool {
    url.starts_with(SOURCE_URL_PREFIX)
}

/// Resolves the human-readable name stored with a download request
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// Derives a name from the link itself, e.g. `album 4aawyAB9vmqN3uQ7FjRGTy`
/// for `https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy?si=...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlNameResolver;

#[async_trait]
impl NameResolver for UrlNameResolver {
    async fn resolve(&self, url: &str) -> Result<String> {
        let path = url
            .strip_prefix(SOURCE_URL_PREFIX)
            .ok_or_else(|| BotError::name_resolution(url, "not a recognised source link"))?;

        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        // Localised links carry a leading `intl-xx` segment
        let mut kind = segments.next();
        if kind.is_some_and(|k| k.starts_with("intl-")) {
            kind = segments.next();
        }

        match (kind, segments.next()) {
            (Some(kind), Some(id)) => Ok(format!("{kind} {id}")),
            _ => Err(BotError::name_resolution(url, "link has no object id")),
        }
    }
}
