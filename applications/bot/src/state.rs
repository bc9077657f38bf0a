//! Shared application state

use album_queue_core::RequestStore;
use std::sync::Arc;

/// State handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RequestStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }
}
