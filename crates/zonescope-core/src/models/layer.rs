//! Overlay layers rendered on top of the base map

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::BoundingBox;

/// Unique key of an overlay layer: the uploaded file name, or a generated
/// key for shapes drawn in-session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerKey(pub String);

impl LayerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Fresh key for a shape drawn in the current session
    pub fn drawn() -> Self {
        Self(format!("drawn-layer-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for LayerKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Capability shared by everything the rendering surface can fit the view to
pub trait Extent {
    /// Bounding box of the content, `None` when the content is empty
    fn extent(&self) -> Option<BoundingBox>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Vector,
    Raster,
}

/// Display style for vector overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStyle {
    pub color: String,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self { color: "blue".to_string(), weight: 2.0, fill_opacity: 0.2 }
    }
}

/// A decoded GeoJSON document with its style
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    pub document: geojson::GeoJson,
    pub style: VectorStyle,
    bbox: Option<BoundingBox>,
}

impl VectorLayer {
    pub fn new(document: geojson::GeoJson, style: VectorStyle, bbox: Option<BoundingBox>) -> Self {
        Self { document, style, bbox }
    }

    /// Number of features (a bare geometry counts as one)
    pub fn feature_count(&self) -> usize {
        match &self.document {
            geojson::GeoJson::FeatureCollection(fc) => fc.features.len(),
            geojson::GeoJson::Feature(_) | geojson::GeoJson::Geometry(_) => 1,
        }
    }
}

impl Extent for VectorLayer {
    fn extent(&self) -> Option<BoundingBox> {
        self.bbox
    }
}

/// Affine mapping from pixel (column, row) to layer coordinates
///
/// `x = origin_x + col * pixel_width + row * row_rotation`
/// `y = origin_y + col * col_rotation + row * pixel_height`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform; `pixel_height` is negative for north-up images
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// Layer coordinates of a pixel corner
    pub fn apply(&self, col: f64, row: f64) -> [f64; 2] {
        [
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        ]
    }
}

/// Decoded raster grid, samples stored pixel-interleaved as f64
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    pub width: u32,
    pub height: u32,
    pub bands: usize,
    pub data: Vec<f64>,
    pub transform: GeoTransform,
    pub no_data: Option<f64>,
    pub epsg: Option<u16>,
}

impl RasterGrid {
    /// Sample value of `band` at pixel (col, row)
    pub fn sample(&self, col: u32, row: u32, band: usize) -> Option<f64> {
        if col >= self.width || row >= self.height || band >= self.bands {
            return None;
        }
        let index = (row as usize * self.width as usize + col as usize) * self.bands + band;
        self.data.get(index).copied()
    }

    /// Min and max of one band, skipping nodata and NaN samples
    pub fn band_range(&self, band: usize) -> Option<(f64, f64)> {
        if band >= self.bands {
            return None;
        }
        self.data
            .iter()
            .skip(band)
            .step_by(self.bands)
            .copied()
            .filter(|v| !v.is_nan() && Some(*v) != self.no_data)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl Extent for RasterGrid {
    fn extent(&self) -> Option<BoundingBox> {
        let (w, h) = (self.width as f64, self.height as f64);
        BoundingBox::from_points([
            self.transform.apply(0.0, 0.0),
            self.transform.apply(w, 0.0),
            self.transform.apply(0.0, h),
            self.transform.apply(w, h),
        ])
    }
}

/// A georeferenced raster with its rendering parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    pub grid: RasterGrid,
    pub opacity: f64,
    pub resolution: u32,
}

impl RasterLayer {
    pub const DEFAULT_OPACITY: f64 = 0.7;
    pub const DEFAULT_RESOLUTION: u32 = 256;

    pub fn new(grid: RasterGrid, opacity: f64, resolution: u32) -> Self {
        Self { grid, opacity, resolution }
    }
}

impl Extent for RasterLayer {
    fn extent(&self) -> Option<BoundingBox> {
        self.grid.extent()
    }
}

/// An overlay layer held by the overlay registry
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayLayer {
    Vector(VectorLayer),
    Raster(RasterLayer),
}

impl OverlayLayer {
    pub fn kind(&self) -> LayerKind {
        match self {
            OverlayLayer::Vector(_) => LayerKind::Vector,
            OverlayLayer::Raster(_) => LayerKind::Raster,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match self {
            OverlayLayer::Vector(layer) => Some(layer),
            OverlayLayer::Raster(_) => None,
        }
    }

    pub fn as_raster(&self) -> Option<&RasterLayer> {
        match self {
            OverlayLayer::Raster(layer) => Some(layer),
            OverlayLayer::Vector(_) => None,
        }
    }
}

impl Extent for OverlayLayer {
    fn extent(&self) -> Option<BoundingBox> {
        match self {
            OverlayLayer::Vector(layer) => layer.extent(),
            OverlayLayer::Raster(layer) => layer.extent(),
        }
    }
}
