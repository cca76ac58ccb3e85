use std::sync::Arc;

use zonescope_core::config::LayeredConfig;
use zonescope_core::Result;
use zonescope_geo::{ZoneDataset, ZoneIntersectionIndex};
use zonescope_store::OverlayRegistry;

use crate::services::{AnalysisSession, FileIngestionPipeline, LoggingResultSink, NominatimGeocoder};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<AnalysisSession>,
}

impl AppState {
    pub fn new(session: Arc<AnalysisSession>) -> Self {
        Self { session }
    }

    /// Build the session from resolved configuration
    ///
    /// A zone dataset that fails to load is logged and kept as unavailable;
    /// the server still starts so uploads and search keep working.
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let zones_path = &config.zones_path.value;
        let zones = ZoneDataset::load(zones_path)
            .map(|dataset| ZoneIntersectionIndex::new(dataset, config.intersection_mode.value));
        if let Err(e) = &zones {
            tracing::error!(path = %zones_path.display(), error = %e, "Zone dataset unavailable");
        }

        let geocoder = NominatimGeocoder::new(config.geocoder_url.value.clone())?;

        let session = AnalysisSession::new(
            zones,
            Arc::new(OverlayRegistry::new()),
            FileIngestionPipeline::from_config(config),
        )
        .with_geocoder(Arc::new(geocoder))
        .with_sink(Arc::new(LoggingResultSink));

        Ok(Self::new(Arc::new(session)))
    }
}
