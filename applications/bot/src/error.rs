//! Bot error types

use album_queue_core::QueueError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not resolve a name for {url}: {reason}")]
    NameResolution { url: String, reason: String },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn name_resolution(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NameResolution {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
