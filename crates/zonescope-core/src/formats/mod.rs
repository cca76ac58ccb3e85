//! Decoders for uploaded overlay files
//!
//! Uploads are classified by file extension into a decoding path: GeoJSON
//! documents become vector layers and GeoTIFF images become raster layers.
//! Anything else is rejected before any content is read.

use crate::error::{Result, ZonescopeError};
use crate::models::job::extension_of;
use crate::models::{FileKind, RasterLayer, VectorStyle};

pub mod geojson;
pub mod geotiff;
pub mod validation;

pub use self::geojson::decode_vector;
pub use self::geotiff::decode_raster;
pub use self::validation::FormatValidation;

/// Classify an upload, failing with `UnsupportedFormat` for unknown extensions
pub fn classify(file_name: &str) -> Result<FileKind> {
    FileKind::from_file_name(file_name).ok_or_else(|| ZonescopeError::UnsupportedFormat {
        file_name: file_name.to_string(),
        extension: extension_of(file_name).unwrap_or("none").to_string(),
        supported: FileKind::supported_extensions(),
    })
}

/// Rendering defaults applied to freshly decoded layers
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    pub vector_style: VectorStyle,
    pub raster_opacity: f64,
    pub raster_resolution: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            vector_style: VectorStyle::default(),
            raster_opacity: RasterLayer::DEFAULT_OPACITY,
            raster_resolution: RasterLayer::DEFAULT_RESOLUTION,
        }
    }
}
