//! Error types for zonescope

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZonescopeError {
    // Ingestion errors
    #[error("Unsupported file format '{extension}' for {file_name}. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        file_name: String,
        extension: String,
        supported: Vec<String>,
    },

    #[error("Malformed vector file {file_name}: {reason}")]
    MalformedVector { file_name: String, reason: String },

    #[error("Malformed raster file {file_name}: {reason}")]
    MalformedRaster { file_name: String, reason: String },

    // Zone dataset errors
    #[error("Restricted zone dataset unavailable at {path}: {reason}")]
    ZoneDatasetUnavailable { path: PathBuf, reason: String },

    // Geocoder errors
    #[error("Place search unavailable: {reason}")]
    GeocodeUnavailable { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ZonescopeError {
    /// The user-facing failure category, if this error belongs to the
    /// ingestion or lookup taxonomy.
    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            ZonescopeError::UnsupportedFormat { .. } => Some(FailureCategory::UnsupportedFormat),
            ZonescopeError::MalformedVector { .. } => Some(FailureCategory::MalformedVector),
            ZonescopeError::MalformedRaster { .. } => Some(FailureCategory::MalformedRaster),
            ZonescopeError::ZoneDatasetUnavailable { .. } => {
                Some(FailureCategory::ZoneDatasetUnavailable)
            }
            ZonescopeError::GeocodeUnavailable { .. } => Some(FailureCategory::GeocodeUnavailable),
            _ => None,
        }
    }
}

/// Failure categories surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    UnsupportedFormat,
    MalformedVector,
    MalformedRaster,
    ZoneDatasetUnavailable,
    GeocodeUnavailable,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureCategory::UnsupportedFormat => "UnsupportedFormat",
            FailureCategory::MalformedVector => "MalformedVector",
            FailureCategory::MalformedRaster => "MalformedRaster",
            FailureCategory::ZoneDatasetUnavailable => "ZoneDatasetUnavailable",
            FailureCategory::GeocodeUnavailable => "GeocodeUnavailable",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, ZonescopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        let err = ZonescopeError::MalformedRaster {
            file_name: "scan.tif".to_string(),
            reason: "not a TIFF".to_string(),
        };
        assert_eq!(err.category(), Some(FailureCategory::MalformedRaster));

        let err = ZonescopeError::Serialization("boom".to_string());
        assert_eq!(err.category(), None);
    }

    #[test]
    fn test_unsupported_format_message_lists_extensions() {
        let err = ZonescopeError::UnsupportedFormat {
            file_name: "notes.txt".to_string(),
            extension: "txt".to_string(),
            supported: vec!["geojson".to_string(), "tif".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("notes.txt"));
        assert!(message.contains("geojson, tif"));
    }
}
