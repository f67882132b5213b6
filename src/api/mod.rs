//! HTTP API module
//!
//! This module contains the popup's control surface: timer commands and the
//! rendered views.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{state::AppState, view::ViewController};
use handlers::*;

/// Shared handler state: the engine for commands, the view for rendering
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<AppState>,
    pub view: Arc<ViewController>,
}

/// Create the HTTP router with all endpoints
pub fn create_router(engine: Arc<AppState>, view: Arc<ViewController>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/phase/:phase", post(phase_handler))
        .route("/view", get(view_handler))
        .route("/stats", get(stats_handler))
        .route("/logs", get(logs_handler))
        .route("/calendar", get(calendar_handler))
        .route("/calendar/:direction", post(calendar_nav_handler))
        .route("/sessions", delete(clear_sessions_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ApiState { engine, view })
}
