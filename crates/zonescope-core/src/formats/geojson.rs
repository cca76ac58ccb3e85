//! GeoJSON vector decoder

use geojson::GeoJson;

use crate::error::{Result, ZonescopeError};
use crate::formats::validation::{document_positions, validate_document};
use crate::models::{BoundingBox, VectorLayer, VectorStyle};

/// Decode the full text of a GeoJSON upload into a vector layer.
///
/// Accepts a FeatureCollection, a single Feature, or a bare geometry. The
/// layer's extent is the bounding box of every position in the document.
pub fn decode_vector(file_name: &str, content: &str, style: VectorStyle) -> Result<VectorLayer> {
    let document: GeoJson = content.parse().map_err(|e| ZonescopeError::MalformedVector {
        file_name: file_name.to_string(),
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    let validation = validate_document(&document);
    for warning in &validation.warnings {
        tracing::warn!(file_name = %file_name, "{}", warning);
    }
    if !validation.is_valid() {
        return Err(ZonescopeError::MalformedVector {
            file_name: file_name.to_string(),
            reason: validation.errors.join("; "),
        });
    }

    if let Some(epsg) = declared_epsg(&document) {
        if epsg != 4326 {
            tracing::warn!(
                file_name = %file_name,
                epsg = epsg,
                "Document declares a non-WGS84 CRS; coordinates are used as-is"
            );
        }
    }

    let bbox = BoundingBox::from_points(document_positions(&document));
    Ok(VectorLayer::new(document, style, bbox))
}

/// EPSG code from a legacy `crs` member, if the document carries one
fn declared_epsg(document: &GeoJson) -> Option<u32> {
    let foreign_members = match document {
        GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
        GeoJson::Feature(feature) => feature.foreign_members.as_ref(),
        GeoJson::Geometry(geometry) => geometry.foreign_members.as_ref(),
    }?;
    extract_epsg_from_crs(foreign_members.get("crs")?)
}

/// Parse "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326" from `properties.name`
fn extract_epsg_from_crs(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    name.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Extent;

    #[test]
    fn test_decode_feature_collection() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[35.0, 31.0], [35.5, 31.0], [35.5, 31.5], [35.0, 31.5], [35.0, 31.0]]]
                    },
                    "properties": {"name": "parcel"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [36.0, 32.0]},
                    "properties": null
                }
            ]
        }"#;

        let layer = decode_vector("parcels.geojson", content, VectorStyle::default()).unwrap();

        assert_eq!(layer.feature_count(), 2);
        assert_eq!(layer.style, VectorStyle::default());
        assert_eq!(layer.extent(), Some(BoundingBox::new(35.0, 31.0, 36.0, 32.0)));
    }

    #[test]
    fn test_decode_single_geometry() {
        let content = r#"{"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,1],[0,1],[0,0]]]}"#;
        let layer = decode_vector("area.geojson", content, VectorStyle::default()).unwrap();

        assert_eq!(layer.feature_count(), 1);
        assert_eq!(layer.extent(), Some(BoundingBox::new(0.0, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn test_decode_empty_collection_has_no_extent() {
        let content = r#"{"type": "FeatureCollection", "features": []}"#;
        let layer = decode_vector("empty.geojson", content, VectorStyle::default()).unwrap();
        assert_eq!(layer.extent(), None);
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_vector("bad.geojson", "not valid json", VectorStyle::default()).unwrap_err();
        match err {
            ZonescopeError::MalformedVector { file_name, reason } => {
                assert_eq!(file_name, "bad.geojson");
                assert!(reason.starts_with("Failed to parse GeoJSON"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_ring_rejected() {
        let content = r#"{"type": "Polygon", "coordinates": [[[0,0],[2,0],[0,0]]]}"#;
        let err = decode_vector("tiny.geojson", content, VectorStyle::default()).unwrap_err();
        assert!(matches!(err, ZonescopeError::MalformedVector { .. }));
    }

    #[test]
    fn test_extract_epsg() {
        let crs = serde_json::json!({
            "type": "name",
            "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}
        });
        assert_eq!(extract_epsg_from_crs(&crs), Some(3857));
        assert_eq!(extract_epsg_from_crs(&serde_json::json!({})), None);
    }
}
