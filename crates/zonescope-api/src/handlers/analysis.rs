use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{AnalysisResponse, AnalyzeRequest, DismissResponse, SendResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    tracing::info!(vertices = request.coordinates.len(), "Processing analysis request");

    let result = state.session.analyze(request.into_polygon()).await?;
    Ok(Json(AnalysisResponse::from(&result)))
}

pub async fn get_analysis(State(state): State<Arc<AppState>>) -> Result<Json<AnalysisResponse>, ApiError> {
    let result = state
        .session
        .current_result()
        .ok_or_else(|| ApiError::not_found("No analysis result"))?;
    Ok(Json(AnalysisResponse::from(&result)))
}

pub async fn dismiss_analysis(State(state): State<Arc<AppState>>) -> Json<DismissResponse> {
    Json(DismissResponse { dismissed: state.session.dismiss_result().is_some() })
}

pub async fn send_analysis(State(state): State<Arc<AppState>>) -> Result<Json<SendResponse>, ApiError> {
    let sent = state.session.send_to_provider().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to send analysis");
        ApiError::from(e)
    })?;

    if !sent {
        return Err(ApiError::not_found("No analysis result to send"));
    }
    Ok(Json(SendResponse { sent }))
}
