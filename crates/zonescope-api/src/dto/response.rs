use chrono::{DateTime, Utc};
use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use zonescope_core::models::{
    AnalysisResult, AnalysisSummary, BoundingBox, Extent, FileKind, IntersectionMode, LayerKey, LayerKind,
    OverlayLayer, RasterLayer, VectorStyle,
};
use zonescope_core::ports::GeocodeMatch;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", version: env!("CARGO_PKG_VERSION") }
    }
}

/// Analysis result: display summary plus raw values
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub summary: AnalysisSummary,
    pub area_m2: f64,
    pub perimeter_m: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            summary: result.summary(),
            area_m2: result.area,
            perimeter_m: result.perimeter,
            created_at: result.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub sent: bool,
}

/// Overlay layer with the data needed to draw it
#[derive(Debug, Serialize)]
pub struct LayerInfo {
    pub key: LayerKey,
    pub kind: LayerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<GeoJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<VectorStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raster: Option<RasterInfo>,
}

impl LayerInfo {
    pub fn new(key: &LayerKey, layer: &OverlayLayer) -> Self {
        let vector = layer.as_vector();
        Self {
            key: key.clone(),
            kind: layer.kind(),
            bbox: layer.extent(),
            feature_count: vector.map(|v| v.feature_count()),
            document: vector.map(|v| v.document.clone()),
            style: vector.map(|v| v.style.clone()),
            raster: layer.as_raster().map(RasterInfo::from),
        }
    }
}

/// Raster rendering parameters and per-band value ranges
#[derive(Debug, Serialize)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
    pub bands: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
    /// `[min, max]` per band, `null` for a band with no valid samples
    pub band_ranges: Vec<Option<(f64, f64)>>,
    pub opacity: f64,
    pub resolution: u32,
}

impl From<&RasterLayer> for RasterInfo {
    fn from(raster: &RasterLayer) -> Self {
        let grid = &raster.grid;
        Self {
            width: grid.width,
            height: grid.height,
            bands: grid.bands,
            epsg: grid.epsg,
            no_data: grid.no_data,
            band_ranges: (0..grid.bands).map(|band| grid.band_range(band)).collect(),
            opacity: raster.opacity,
            resolution: raster.resolution,
        }
    }
}

/// Restricted zones and the style they are drawn with
#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    pub style: VectorStyle,
    pub zones: FeatureCollection,
}

impl ZonesResponse {
    pub fn new(zones: FeatureCollection) -> Self {
        Self { style: zone_style(), zones }
    }
}

fn zone_style() -> VectorStyle {
    VectorStyle { color: "red".to_string(), fill_opacity: 0.2, ..VectorStyle::default() }
}

/// Upload operation response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub key: LayerKey,
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveLayerResponse {
    pub key: LayerKey,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub result: Option<GeocodeMatch>,
}

/// Session status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub busy: bool,
    pub layer_count: usize,
    pub zones_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection_mode: Option<IntersectionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_view: Option<BoundingBox>,
}
