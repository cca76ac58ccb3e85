use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::StatusResponse;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn session_status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let session = &state.session;
    let layers = session.layers().await?;

    Ok(Json(StatusResponse {
        busy: session.is_busy(),
        layer_count: layers.len(),
        zones_available: session.zones_available(),
        zone_count: session.zone_count(),
        intersection_mode: session.intersection_mode(),
        requested_view: session.requested_view(),
    }))
}
