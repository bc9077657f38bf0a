//! HTTP routes

pub mod health;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
