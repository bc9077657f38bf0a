//! Album Queue Core
//!
//! Request queue state model shared by the bot front end, the storage
//! backends and any external download worker.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `DownloadQueueRequest`, `PlaylistRequest`, `MusicFile`
//! - **Storage Contract**: the `RequestStore` trait and an in-memory backend
//! - **Lifecycle Rules**: `RequestLifecycle`, the policy layer over a store
//! - **Execution Context**: `OpContext`, cancellation and deadlines per call
//! - **Error Handling**: unified `QueueError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use album_queue_core::{
//!     CreatorId, InMemoryRequestStore, NewDownloadRequest, OpContext, RequestLifecycle,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> album_queue_core::Result<()> {
//! let lifecycle = RequestLifecycle::new(Arc::new(InMemoryRequestStore::new()));
//! let ctx = OpContext::new();
//!
//! let id = lifecycle
//!     .submit_download(
//!         &ctx,
//!         NewDownloadRequest::new("https://open.spotify.com/album/X", CreatorId::new(42))
//!             .with_name("Test Album"),
//!     )
//!     .await?;
//!
//! lifecycle.deactivate(&ctx, &id).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use context::OpContext;
pub use error::{ErrorKind, QueueError, Result};
pub use lifecycle::RequestLifecycle;
pub use memory::InMemoryRequestStore;
pub use storage::RequestStore;

pub use types::{
    CreatorId, DownloadQueueRequest, MusicFile, NewDownloadRequest, NewMusicFile,
    NewPlaylistRequest, PlaylistRequest, RequestId, TrackKeys, TrackMetadata,
};
