//! Common test utilities and fixtures
#![allow(dead_code)]

use album_queue::{handler::CommandHandler, BotError, NameResolver, UrlNameResolver};
use album_queue_core::{InMemoryRequestStore, RequestLifecycle, RequestStore};
use async_trait::async_trait;
use std::sync::Arc;

pub mod fixtures {
    pub const ALLOWED_USER: i64 = 42;
    pub const OTHER_ALLOWED_USER: i64 = 43;
    pub const STRANGER: i64 = 666;

    pub const ALBUM_URL: &str = "https://open.spotify.com/album/X";
    pub const PLAYLIST_URL: &str = "https://open.spotify.com/playlist/P";
}

/// Resolver returning a fixed name
pub struct FixedNameResolver(pub &'static str);

#[async_trait]
impl NameResolver for FixedNameResolver {
    async fn resolve(&self, _url: &str) -> album_queue::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Resolver that always fails
pub struct FailingNameResolver;

#[async_trait]
impl NameResolver for FailingNameResolver {
    async fn resolve(&self, url: &str) -> album_queue::Result<String> {
        Err(BotError::name_resolution(url, "lookup service down"))
    }
}

pub struct TestBot {
    pub store: Arc<InMemoryRequestStore>,
    pub handler: CommandHandler,
}

impl TestBot {
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(UrlNameResolver))
    }

    pub fn with_resolver(resolver: Arc<dyn NameResolver>) -> Self {
        let store = Arc::new(InMemoryRequestStore::new());
        let lifecycle = RequestLifecycle::new(Arc::clone(&store) as Arc<dyn RequestStore>);
        let handler = CommandHandler::new(
            lifecycle,
            resolver,
            [fixtures::ALLOWED_USER, fixtures::OTHER_ALLOWED_USER],
        );

        Self { store, handler }
    }

    /// Send `text` as `sender` and return the reply text
    pub async fn send(&self, sender: i64, text: &str) -> Option<String> {
        self.handler
            .handle(&album_queue::IncomingMessage::new(sender, text))
            .await
            .map(|reply| reply.text)
    }
}
