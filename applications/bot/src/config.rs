//! Bot configuration
//!
//! Loaded from an optional TOML file overlaid by `ALBUM_QUEUE_*` environment
//! variables, with `__` between nested keys:
//!
//! ```text
//! ALBUM_QUEUE_STORAGE__DATABASE_URL=sqlite://./data/queue.db
//! ALBUM_QUEUE_BOT__WHITELIST=1001,1002
//! ALBUM_QUEUE_HEALTH__PORT=8080
//! ```

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "album-queue.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_bot")]
    pub bot: BotSettings,

    #[serde(default = "default_health")]
    pub health: HealthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotSettings {
    /// Sender ids allowed to talk to the bot
    #[serde(default)]
    pub whitelist: Vec<i64>,

    /// Identity used for commands typed on the console
    #[serde(default)]
    pub console_user_id: Option<i64>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl BotConfig {
    /// Load configuration from `path` (or [`DEFAULT_CONFIG_FILE`] if present)
    /// and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(BotError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ALBUM_QUEUE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("bot.whitelist")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(BotError::Config(
                "database URL is required (set ALBUM_QUEUE_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(BotError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.bot.whitelist.is_empty() {
            return Err(BotError::Config(
                "bot whitelist is empty (set ALBUM_QUEUE_BOT__WHITELIST)".to_string(),
            ));
        }

        if self.bot.request_timeout_secs == 0 {
            return Err(BotError::Config(
                "bot.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.bot.request_timeout_secs)
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/album-queue.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_bot() -> BotSettings {
    BotSettings {
        whitelist: Vec::new(),
        console_user_id: None,
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_health() -> HealthSettings {
    HealthSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            bot: default_bot(),
            health: default_health(),
        }
    }
}
