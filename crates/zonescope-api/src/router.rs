use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Analysis of drawn polygons
        .route(
            "/api/v1/analysis",
            post(handlers::analyze).get(handlers::get_analysis).delete(handlers::dismiss_analysis),
        )
        .route("/api/v1/analysis/send", post(handlers::send_analysis))

        // Overlay layers
        .route("/api/v1/layers", get(handlers::list_layers).post(handlers::upload_layer))
        .route("/api/v1/layers/{key}", get(handlers::get_layer).delete(handlers::remove_layer))

        // Restricted zones drawn beneath the overlays
        .route("/api/v1/zones", get(handlers::list_zones))

        // Place search and session status
        .route("/api/v1/search", get(handlers::search))
        .route("/api/v1/status", get(handlers::session_status))

        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
