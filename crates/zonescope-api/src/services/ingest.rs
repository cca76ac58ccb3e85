//! Upload decoding into overlay layers
//!
//! A job moves `Pending -> Decoding -> {Success, Failure}`. Classification
//! happens before any content is read, so unsupported uploads fail without
//! touching the source. Raster reads report progress as bytes read over the
//! declared total; the decode itself runs on the blocking pool.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use zonescope_core::config::LayeredConfig;
use zonescope_core::formats::{self, decode_raster, decode_vector, DecodeOptions};
use zonescope_core::models::{BoundingBox, Extent, FileKind, IngestionJob, JobEvent, OverlayLayer};
use zonescope_core::{FailureCategory, Result, ZonescopeError};

/// An uploaded file: its name, declared length and content stream
pub struct UploadSource {
    pub file_name: String,
    pub total_len: Option<u64>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadSource {
    pub fn new(
        file_name: impl Into<String>,
        total_len: Option<u64>,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self { file_name: file_name.into(), total_len, reader: Box::new(reader) }
    }

    /// Upload held fully in memory
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let total_len = Some(bytes.len() as u64);
        Self::new(file_name, total_len, std::io::Cursor::new(bytes))
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSource")
            .field("file_name", &self.file_name)
            .field("total_len", &self.total_len)
            .finish_non_exhaustive()
    }
}

/// A decoded upload ready to be registered
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedLayer {
    pub file_name: String,
    pub layer: OverlayLayer,
    /// Region the map view should fit to
    pub bbox: Option<BoundingBox>,
}

impl IngestedLayer {
    pub fn file_kind(&self) -> FileKind {
        match self.layer {
            OverlayLayer::Vector(_) => FileKind::Vector,
            OverlayLayer::Raster(_) => FileKind::Raster,
        }
    }
}

/// Decodes uploads into overlay layers
#[derive(Debug, Clone)]
pub struct FileIngestionPipeline {
    options: DecodeOptions,
    chunk_size: usize,
}

impl Default for FileIngestionPipeline {
    fn default() -> Self {
        Self::new(DecodeOptions::default(), zonescope_core::config::DEFAULT_READ_CHUNK_SIZE)
    }
}

impl FileIngestionPipeline {
    pub fn new(options: DecodeOptions, chunk_size: usize) -> Self {
        Self { options, chunk_size: chunk_size.max(1) }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        let options = DecodeOptions {
            raster_opacity: config.raster_opacity.value,
            raster_resolution: config.raster_resolution.value,
            ..DecodeOptions::default()
        };
        Self::new(options, config.read_chunk_size.value)
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode an upload, sending progress events on `events`
    ///
    /// Only progress is sent here. The caller emits the terminal event once
    /// it has applied (or discarded) the outcome; see [`terminal_event`].
    ///
    /// Progress never waits on the receiver: an event is dropped unless the
    /// channel has room for it and one more, so the terminal event always
    /// fits. Drain the receiver concurrently to see every progress step.
    pub async fn ingest(
        &self,
        mut source: UploadSource,
        events: Option<&mpsc::Sender<JobEvent>>,
    ) -> Result<IngestedLayer> {
        let mut job = IngestionJob::new(source.file_name.clone());
        let kind = formats::classify(&source.file_name)?;

        job.start_decoding();
        tracing::info!(file_name = %source.file_name, kind = ?kind, total_len = ?source.total_len, "Decoding upload");

        let result = match kind {
            FileKind::Vector => self.ingest_vector(&mut source, &mut job).await,
            FileKind::Raster => self.ingest_raster(&mut source, &mut job, events).await,
        };

        match &result {
            Ok(_) => job.succeed(),
            Err(e) => job.fail(failure_category(e, kind)),
        }
        tracing::debug!(file_name = %job.file_name, status = ?job.status, "Job finished");

        result
    }

    async fn ingest_vector(&self, source: &mut UploadSource, job: &mut IngestionJob) -> Result<IngestedLayer> {
        let bytes = self.read_all(source, job, FileKind::Vector, None).await?;
        let content = String::from_utf8(bytes).map_err(|e| ZonescopeError::MalformedVector {
            file_name: source.file_name.clone(),
            reason: format!("File is not valid UTF-8: {}", e),
        })?;

        let layer = decode_vector(&source.file_name, &content, self.options.vector_style.clone())?;
        tracing::info!(file_name = %source.file_name, features = layer.feature_count(), "Decoded vector layer");

        Ok(IngestedLayer {
            file_name: source.file_name.clone(),
            bbox: layer.extent(),
            layer: OverlayLayer::Vector(layer),
        })
    }

    async fn ingest_raster(
        &self,
        source: &mut UploadSource,
        job: &mut IngestionJob,
        events: Option<&mpsc::Sender<JobEvent>>,
    ) -> Result<IngestedLayer> {
        let bytes = self.read_all(source, job, FileKind::Raster, events).await?;

        let file_name = source.file_name.clone();
        let opacity = self.options.raster_opacity;
        let resolution = self.options.raster_resolution;
        let layer = tokio::task::spawn_blocking(move || decode_raster(&file_name, &bytes, opacity, resolution))
            .await
            .map_err(|e| ZonescopeError::MalformedRaster {
                file_name: source.file_name.clone(),
                reason: format!("Raster decoder task failed: {}", e),
            })??;

        tracing::info!(
            file_name = %source.file_name,
            width = layer.grid.width,
            height = layer.grid.height,
            bands = layer.grid.bands,
            "Decoded raster layer"
        );

        Ok(IngestedLayer {
            file_name: source.file_name.clone(),
            bbox: layer.extent(),
            layer: OverlayLayer::Raster(layer),
        })
    }

    /// Read the whole source in chunks. Progress is only reported when the
    /// total length is known and non-zero.
    async fn read_all(
        &self,
        source: &mut UploadSource,
        job: &mut IngestionJob,
        kind: FileKind,
        events: Option<&mpsc::Sender<JobEvent>>,
    ) -> Result<Vec<u8>> {
        let total = source.total_len.filter(|&total| total > 0);
        let mut buffer = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let read = source
                .reader
                .read(&mut chunk)
                .await
                .map_err(|e| read_error(kind, &source.file_name, e))?;
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            if let (Some(total), Some(events)) = (total, events) {
                if let Some(fraction) = job.record_progress(buffer.len() as f64 / total as f64) {
                    send_progress(events, JobEvent::Progress { file_name: source.file_name.clone(), fraction });
                }
            }
        }

        Ok(buffer)
    }
}

/// Terminal event describing a finished job
pub fn terminal_event(file_name: &str, outcome: std::result::Result<FileKind, &ZonescopeError>) -> JobEvent {
    match outcome {
        Ok(kind) => JobEvent::Succeeded { file_name: file_name.to_string(), kind },
        Err(e) => JobEvent::Failed {
            file_name: file_name.to_string(),
            category: failure_category(e, FileKind::from_file_name(file_name).unwrap_or(FileKind::Vector)),
            message: e.to_string(),
        },
    }
}

/// Send an event, ignoring a receiver that has gone away
pub(crate) async fn emit(events: &mpsc::Sender<JobEvent>, event: JobEvent) {
    if events.send(event).await.is_err() {
        tracing::debug!("Job event receiver dropped");
    }
}

/// Queue a progress event without waiting, keeping one slot free
fn send_progress(events: &mpsc::Sender<JobEvent>, event: JobEvent) {
    if events.capacity() <= 1 {
        tracing::trace!("Job event channel nearly full, skipping progress");
        return;
    }
    if let Err(e) = events.try_send(event) {
        tracing::debug!(error = %e, "Progress event not sent");
    }
}

fn failure_category(err: &ZonescopeError, kind: FileKind) -> FailureCategory {
    err.category().unwrap_or(match kind {
        FileKind::Vector => FailureCategory::MalformedVector,
        FileKind::Raster => FailureCategory::MalformedRaster,
    })
}

fn read_error(kind: FileKind, file_name: &str, err: std::io::Error) -> ZonescopeError {
    let reason = format!("Failed to read upload: {}", err);
    match kind {
        FileKind::Vector => ZonescopeError::MalformedVector { file_name: file_name.to_string(), reason },
        FileKind::Raster => ZonescopeError::MalformedRaster { file_name: file_name.to_string(), reason },
    }
}
