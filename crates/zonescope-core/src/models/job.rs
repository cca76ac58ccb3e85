//! Ingestion job state for a single upload

use serde::{Deserialize, Serialize};

use crate::error::FailureCategory;

/// Decoding path chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Vector,
    Raster,
}

impl FileKind {
    pub const VECTOR_EXTENSIONS: &'static [&'static str] = &["geojson", "json"];
    pub const RASTER_EXTENSIONS: &'static [&'static str] = &["tif", "tiff"];

    /// Classify a file name by its extension, case-insensitively
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = extension_of(file_name)?.to_ascii_lowercase();
        if Self::VECTOR_EXTENSIONS.contains(&extension.as_str()) {
            Some(FileKind::Vector)
        } else if Self::RASTER_EXTENSIONS.contains(&extension.as_str()) {
            Some(FileKind::Raster)
        } else {
            None
        }
    }

    /// All accepted extensions, vector first
    pub fn supported_extensions() -> Vec<String> {
        Self::VECTOR_EXTENSIONS
            .iter()
            .chain(Self::RASTER_EXTENSIONS)
            .map(|s| s.to_string())
            .collect()
    }
}

/// Text after the last dot, if any
pub fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Decoding,
    Success,
    Failure,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failure)
    }
}

/// Transient per-upload state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionJob {
    pub file_name: String,
    pub kind: Option<FileKind>,
    /// `None` while progress is indeterminate
    pub progress: Option<f64>,
    pub status: JobStatus,
    pub failure: Option<FailureCategory>,
}

impl IngestionJob {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let kind = FileKind::from_file_name(&file_name);
        Self { file_name, kind, progress: None, status: JobStatus::Pending, failure: None }
    }

    pub fn start_decoding(&mut self) {
        if self.status == JobStatus::Pending {
            self.status = JobStatus::Decoding;
        }
    }

    /// Record progress, clamped to [0, 1] and never moving backwards.
    /// Returns the stored fraction when it changed.
    pub fn record_progress(&mut self, fraction: f64) -> Option<f64> {
        if self.status != JobStatus::Decoding || fraction.is_nan() {
            return None;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        match self.progress {
            Some(current) if fraction <= current => None,
            _ => {
                self.progress = Some(fraction);
                self.progress
            }
        }
    }

    pub fn succeed(&mut self) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Success;
        }
    }

    pub fn fail(&mut self, category: FailureCategory) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Failure;
            self.failure = Some(category);
        }
    }
}

/// Event emitted by a running ingestion job. The terminal variant
/// (`Succeeded` or `Failed`) is always the last event of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    Progress { file_name: String, fraction: f64 },
    Succeeded { file_name: String, kind: FileKind },
    Failed { file_name: String, category: FailureCategory, message: String },
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress { .. })
    }
}
