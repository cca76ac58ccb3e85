//! Analysis session orchestration
//!
//! The session owns the overlay registry handle, the zone index and the
//! ingestion pipeline. Drawn polygons are measured, checked against the
//! zones and kept as overlays; uploads are decoded and registered under
//! their file name.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use zonescope_core::models::{
    AnalysisResult, BoundingBox, FileKind, IntersectionMode, JobEvent, LayerKey, OverlayLayer, Polygon,
    VectorLayer, VectorStyle,
};
use zonescope_core::ports::{GeocodeMatch, Geocoder, ResultSink};
use zonescope_core::{Result, ZonescopeError};
use zonescope_geo::{metrics, ZoneIntersectionIndex};
use zonescope_store::{LayerSnapshot, OverlayStore};

use super::ingest::{emit, terminal_event, FileIngestionPipeline, IngestedLayer, UploadSource};
use super::sink::LoggingResultSink;

/// What a successful upload changed
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub key: LayerKey,
    pub kind: FileKind,
    pub bbox: Option<BoundingBox>,
}

/// Zone index, or why it could not be loaded
enum ZoneState {
    Ready(Arc<ZoneIntersectionIndex>),
    Unavailable { path: PathBuf, reason: String },
}

impl ZoneState {
    fn index(&self) -> Result<&Arc<ZoneIntersectionIndex>> {
        match self {
            ZoneState::Ready(index) => Ok(index),
            ZoneState::Unavailable { path, reason } => {
                Err(ZonescopeError::ZoneDatasetUnavailable { path: path.clone(), reason: reason.clone() })
            }
        }
    }
}

/// Counts a job as in flight until dropped
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AnalysisSession {
    zones: ZoneState,
    registry: Arc<dyn OverlayStore>,
    pipeline: FileIngestionPipeline,
    geocoder: Option<Arc<dyn Geocoder>>,
    sink: Arc<dyn ResultSink>,
    drawn_style: VectorStyle,
    current: RwLock<Option<AnalysisResult>>,
    view: RwLock<Option<BoundingBox>>,
    in_flight: AtomicUsize,
}

impl AnalysisSession {
    /// Create a session. A failed zone load is kept so analysis can report
    /// it; uploads and search still work.
    pub fn new(
        zones: Result<ZoneIntersectionIndex>,
        registry: Arc<dyn OverlayStore>,
        pipeline: FileIngestionPipeline,
    ) -> Self {
        let zones = match zones {
            Ok(index) => ZoneState::Ready(Arc::new(index)),
            Err(ZonescopeError::ZoneDatasetUnavailable { path, reason }) => ZoneState::Unavailable { path, reason },
            Err(other) => ZoneState::Unavailable { path: PathBuf::new(), reason: other.to_string() },
        };

        Self {
            zones,
            registry,
            drawn_style: pipeline.options().vector_style.clone(),
            pipeline,
            geocoder: None,
            sink: Arc::new(LoggingResultSink),
            current: RwLock::new(None),
            view: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Measure a drawn polygon, find the zones it touches, keep the shape
    /// as an overlay and publish the result.
    ///
    /// A ring with fewer than four positions still gets its zero result but
    /// is not kept as an overlay.
    pub async fn analyze(&self, polygon: Polygon) -> Result<AnalysisResult> {
        let index = self.zones.index()?;

        let boundary = metrics::boundary(&polygon);
        let measurement = metrics::measure(&polygon);
        let zones = index.intersecting(&polygon);
        let result = AnalysisResult::new(boundary.clone(), measurement, zones);

        let key = if boundary.len() >= metrics::MIN_RING_POSITIONS {
            let ring = Polygon::new(boundary);
            let drawn = VectorLayer::new(
                geojson::GeoJson::Geometry(ring.to_geojson()),
                self.drawn_style.clone(),
                ring.bounding_box(),
            );
            let key = LayerKey::drawn();
            self.registry.add(key.clone(), OverlayLayer::Vector(drawn)).await?;
            Some(key)
        } else {
            tracing::debug!(positions = boundary.len(), "Degenerate ring, not kept as an overlay");
            None
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());

        tracing::info!(
            key = ?key,
            area = result.area,
            perimeter = result.perimeter,
            zones = ?result.intersecting_zones,
            "Analyzed drawn polygon"
        );
        Ok(result)
    }

    pub fn current_result(&self) -> Option<AnalysisResult> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Clear the published result. The drawn overlay stays.
    pub fn dismiss_result(&self) -> Option<AnalysisResult> {
        self.current.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Send the current result to the provider sink. Returns `false` when
    /// there is nothing to send.
    pub async fn send_to_provider(&self) -> Result<bool> {
        let Some(result) = self.current_result() else {
            return Ok(false);
        };
        self.sink.send(&result).await?;
        Ok(true)
    }

    pub async fn submit(&self, source: UploadSource) -> Result<IngestOutcome> {
        self.submit_with_progress(source, None).await
    }

    /// Ingest an upload. On success the layer is registered under the file
    /// name and the view is fit to it; on failure nothing changes. The
    /// terminal event is sent after the registry is updated.
    pub async fn submit_with_progress(
        &self,
        source: UploadSource,
        events: Option<mpsc::Sender<JobEvent>>,
    ) -> Result<IngestOutcome> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let file_name = source.file_name.clone();

        let outcome = match self.pipeline.ingest(source, events.as_ref()).await {
            Ok(ingested) => self.apply(ingested).await,
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(applied) => tracing::info!(key = %applied.key, kind = ?applied.kind, "Registered uploaded layer"),
            Err(e) => tracing::warn!(file_name = %file_name, category = ?e.category(), error = %e, "Upload failed"),
        }

        if let Some(events) = &events {
            emit(events, terminal_event(&file_name, outcome.as_ref().map(|applied| applied.kind))).await;
        }
        outcome
    }

    async fn apply(&self, ingested: IngestedLayer) -> Result<IngestOutcome> {
        let key = LayerKey::new(ingested.file_name.clone());
        let kind = ingested.file_kind();
        let bbox = ingested.bbox;

        self.registry.add(key.clone(), ingested.layer).await?;
        if let Some(bbox) = bbox {
            *self.view.write().unwrap_or_else(PoisonError::into_inner) = Some(bbox);
        }

        Ok(IngestOutcome { key, kind, bbox })
    }

    /// True while any upload is being decoded
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Last region the map view was asked to fit
    pub fn requested_view(&self) -> Option<BoundingBox> {
        *self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a place. An unavailable geocoder is reported as no result.
    pub async fn search(&self, query: &str) -> Option<GeocodeMatch> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let Some(geocoder) = &self.geocoder else {
            tracing::warn!(query = %query, "No geocoder configured");
            return None;
        };

        match geocoder.geocode(query).await {
            Ok(found) => {
                if let Some(place) = &found {
                    let [lon, lat] = place.coordinates;
                    *self.view.write().unwrap_or_else(PoisonError::into_inner) =
                        Some(BoundingBox::new(lon, lat, lon, lat));
                }
                found
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Place search failed");
                None
            }
        }
    }

    pub async fn layers(&self) -> Result<LayerSnapshot> {
        self.registry.list().await
    }

    pub async fn layer(&self, key: &LayerKey) -> Result<Option<Arc<OverlayLayer>>> {
        self.registry.get(key).await
    }

    /// Remove a layer. Returns whether it existed.
    pub async fn remove_layer(&self, key: &LayerKey) -> Result<bool> {
        Ok(self.registry.remove(key).await?.is_some())
    }

    /// Restricted zones as a FeatureCollection, for drawing beneath the overlays
    pub fn zones_geojson(&self) -> Result<geojson::FeatureCollection> {
        Ok(self.zones.index()?.to_feature_collection())
    }

    pub fn zones_available(&self) -> bool {
        matches!(self.zones, ZoneState::Ready(_))
    }

    pub fn zone_count(&self) -> Option<usize> {
        self.zones.index().ok().map(|index| index.len())
    }

    pub fn intersection_mode(&self) -> Option<IntersectionMode> {
        self.zones.index().ok().map(|index| index.mode())
    }
}
