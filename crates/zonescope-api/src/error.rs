use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use zonescope_core::{FailureCategory, ZonescopeError};

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub category: Option<FailureCategory>,
    pub details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), category: None, details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn with_category(mut self, category: Option<FailureCategory>) -> Self {
        self.category = category;
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<FailureCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, category: self.category, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<ZonescopeError> for ApiError {
    fn from(err: ZonescopeError) -> Self {
        let category = err.category();
        let base = match category {
            Some(FailureCategory::UnsupportedFormat) => Self::bad_request("Unsupported file format"),
            Some(FailureCategory::MalformedVector) => Self::bad_request("Malformed vector file"),
            Some(FailureCategory::MalformedRaster) => Self::bad_request("Malformed raster file"),
            Some(FailureCategory::ZoneDatasetUnavailable) => {
                Self::service_unavailable("Zone dataset unavailable")
            }
            Some(FailureCategory::GeocodeUnavailable) => Self::service_unavailable("Place search unavailable"),
            None => Self::internal("Internal error"),
        };
        base.with_category(category).with_details(err.to_string())
    }
}
