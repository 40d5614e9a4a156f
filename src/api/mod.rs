//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/:user_id", get(timer_page_handler))
        .route("/api/timer/:user_id/status", get(status_handler))
        .route("/api/timer/:user_id/start", post(start_handler))
        .route("/api/timer/:user_id/pause", post(pause_handler))
        .route("/api/timer/:user_id/resume", post(resume_handler))
        .route("/api/timer/:user_id/stop", post(stop_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
