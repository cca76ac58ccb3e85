use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tokio::sync::mpsc;
use zonescope_core::models::{JobEvent, LayerKey};

use crate::dto::{LayerInfo, RemoveLayerResponse, UploadResponse};
use crate::error::ApiError;
use crate::services::UploadSource;
use crate::state::AppState;

pub async fn list_layers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<LayerInfo>>, ApiError> {
    let snapshot = state.session.layers().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list layers");
        ApiError::from(e)
    })?;

    Ok(Json(snapshot.iter().map(|(key, layer)| LayerInfo::new(key, layer)).collect()))
}

pub async fn get_layer(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<LayerInfo>, ApiError> {
    let key = LayerKey::new(key);
    let layer = state
        .session
        .layer(&key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No layer named {}", key)))?;

    Ok(Json(LayerInfo::new(&key, &layer)))
}

pub async fn upload_layer(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (file_name, data) = extract_file(&mut multipart).await?;

    tracing::info!(file_name = %file_name, size = data.len(), "Received file for ingestion");

    let (tx, rx) = mpsc::channel(32);
    let progress = tokio::spawn(log_progress(rx));

    let outcome = state.session.submit_with_progress(UploadSource::from_bytes(file_name, data), Some(tx)).await;
    // The sender is gone once submit returns, so the logger drains and exits
    let _ = progress.await;
    let outcome = outcome?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Successfully ingested {}", outcome.key),
        key: outcome.key,
        kind: outcome.kind,
        bbox: outcome.bbox,
    }))
}

pub async fn remove_layer(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<RemoveLayerResponse>, ApiError> {
    let key = LayerKey::new(key);
    let removed = state.session.remove_layer(&key).await?;

    tracing::info!(key = %key, removed = removed, "Remove layer request");
    Ok(Json(RemoveLayerResponse { key, removed }))
}

async fn log_progress(mut rx: mpsc::Receiver<JobEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::Progress { file_name, fraction } => {
                tracing::debug!(file_name = %file_name, fraction = fraction, "Upload progress");
            }
            JobEvent::Succeeded { file_name, kind } => {
                tracing::debug!(file_name = %file_name, kind = ?kind, "Upload succeeded");
            }
            JobEvent::Failed { file_name, category, message } => {
                tracing::debug!(file_name = %file_name, category = %category, message = %message, "Upload failed");
            }
        }
    }
}

async fn extract_file(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::bad_request("Failed to parse multipart form").with_details(e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::bad_request("File name is required"))?;
            let data = field.bytes().await.map_err(|e| {
                ApiError::bad_request("Failed to read file data").with_details(e.to_string())
            })?;
            return Ok((file_name, data.to_vec()));
        }
    }

    Err(ApiError::bad_request("No file provided").with_details("Expected a 'file' field in the multipart form"))
}
