use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::ZonesResponse;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_zones(State(state): State<Arc<AppState>>) -> Result<Json<ZonesResponse>, ApiError> {
    let zones = state.session.zones_geojson()?;
    Ok(Json(ZonesResponse::new(zones)))
}
