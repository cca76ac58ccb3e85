//! GeoTIFF raster decoder
//!
//! Georeferencing is read from the standard GeoTIFF tags: either
//! ModelPixelScale + ModelTiepoint, or a full ModelTransformation matrix.
//! A TIFF carrying neither is rejected because it cannot be placed on the map.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::{Result, ZonescopeError};
use crate::models::{GeoTransform, RasterGrid, RasterLayer};

const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const GDAL_NODATA_TAG: u16 = 42113;

/// Decode a GeoTIFF held fully in memory into a raster layer
pub fn decode_raster(
    file_name: &str,
    bytes: &[u8],
    opacity: f64,
    resolution: u32,
) -> Result<RasterLayer> {
    let malformed = |reason: String| ZonescopeError::MalformedRaster {
        file_name: file_name.to_string(),
        reason,
    };

    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| malformed(format!("Not a readable TIFF: {}", e)))?;

    let (width, height) =
        decoder.dimensions().map_err(|e| malformed(format!("Missing image dimensions: {}", e)))?;

    let transform = read_transform(&mut decoder).ok_or_else(|| {
        malformed("Missing spatial reference (no ModelPixelScale/ModelTiepoint or ModelTransformation tags)".to_string())
    })?;

    let epsg = decoder
        .get_tag_u16_vec(Tag::GeoKeyDirectoryTag)
        .ok()
        .and_then(|directory| epsg_from_geokeys(&directory));

    let no_data = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());

    let image =
        decoder.read_image().map_err(|e| malformed(format!("Failed to decode image data: {}", e)))?;
    let data = samples_as_f64(image);

    let pixels = width as usize * height as usize;
    if pixels == 0 || data.len() % pixels != 0 {
        return Err(malformed(format!(
            "Sample count {} does not match a {}x{} grid",
            data.len(),
            width,
            height
        )));
    }
    let bands = data.len() / pixels;

    tracing::debug!(
        file_name = %file_name,
        width = width,
        height = height,
        bands = bands,
        epsg = ?epsg,
        "Decoded GeoTIFF"
    );

    let grid = RasterGrid { width, height, bands, data, transform, no_data, epsg };
    Ok(RasterLayer::new(grid, opacity, resolution))
}

fn read_transform<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    if let Ok(matrix) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if matrix.len() >= 8 {
            // Row-major 4x4; only the 2D affine part is used.
            return Some(GeoTransform {
                origin_x: matrix[3],
                pixel_width: matrix[0],
                row_rotation: matrix[1],
                origin_y: matrix[7],
                col_rotation: matrix[4],
                pixel_height: matrix[5],
            });
        }
    }

    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // Tiepoint maps raster (i, j) to model (x, y); shift it back to pixel (0, 0).
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let (scale_x, scale_y) = (scale[0], scale[1]);
    Some(GeoTransform::north_up(x - i * scale_x, y + j * scale_y, scale_x, -scale_y))
}

/// EPSG code from a GeoKeyDirectory, projected CRS preferred over geographic
fn epsg_from_geokeys(directory: &[u16]) -> Option<u16> {
    let header = directory.get(..4)?;
    let key_count = header[3] as usize;

    let mut geographic = None;
    for entry in directory[4..].chunks_exact(4).take(key_count) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        // Location 0 means the value is stored inline.
        if location != 0 {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_GEO_KEY => return Some(value),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(value),
            _ => {}
        }
    }
    geographic
}

fn samples_as_f64(image: DecodingResult) -> Vec<f64> {
    match image {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}
