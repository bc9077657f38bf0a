//! Album Queue Bot
//!
//! Chat front end and health endpoint for the album download queue. The
//! command handler is transport-independent; the binary drives it from the
//! console, and a chat transport only needs to feed it messages.
//!
//! This library exposes the components for testing purposes.

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod handler;
pub mod resolver;
pub mod state;

// Re-export commonly used types for convenience
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use handler::{CommandHandler, IncomingMessage, Reply};
pub use resolver::{NameResolver, UrlNameResolver};
pub use state::AppState;
