//! Restricted-zone dataset and intersection index

use crate::spatial::{bbox_envelope, multi_polygon_envelope, polygon_intersects_zone};
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson};
use rstar::{RTree, RTreeObject, AABB};
use std::path::{Path, PathBuf};
use zonescope_core::models::{BoundingBox, IntersectionMode, Polygon};
use zonescope_core::{Result, ZonescopeError};

/// A named restricted zone
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Zone {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        use geo::algorithm::bounding_rect::BoundingRect;
        self.geometry.bounding_rect().map(BoundingBox::from)
    }
}

/// Zones in the order they appear in the source document
#[derive(Debug, Clone, Default)]
pub struct ZoneDataset {
    zones: Vec<Zone>,
}

impl ZoneDataset {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Parse a GeoJSON FeatureCollection held in memory
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<memory>"))
    }

    /// Read and parse the dataset file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| unavailable(path, format!("Failed to read zone dataset: {e}")))?;
        let dataset = Self::parse(&content, path)?;

        tracing::info!(path = %path.display(), zones = dataset.len(), "Loaded zone dataset");
        Ok(dataset)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let document: GeoJson = content
            .parse()
            .map_err(|e| unavailable(path, format!("Failed to parse GeoJSON: {e}")))?;

        let features = match document {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(unavailable(path, "Expected a FeatureCollection of named zones".to_string()));
            }
        };

        let zones = features
            .into_iter()
            .enumerate()
            .map(|(position, feature)| zone_from_feature(position, feature, path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { zones })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn zone_from_feature(position: usize, feature: Feature, path: &Path) -> Result<Zone> {
    let name = feature
        .property("name")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| unavailable(path, format!("Feature {position} has no string 'name' property")))?;

    let geometry = feature
        .geometry
        .ok_or_else(|| unavailable(path, format!("Zone '{name}' has no geometry")))?;

    let geometry = geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| unavailable(path, format!("Zone '{name}' has invalid geometry: {e}")))?;

    let geometry = match geometry {
        geo::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
        geo::Geometry::MultiPolygon(multi) => multi,
        _ => {
            return Err(unavailable(path, format!("Zone '{name}' is not a Polygon or MultiPolygon")));
        }
    };

    Ok(Zone { name, geometry })
}

fn unavailable(path: &Path, reason: String) -> ZonescopeError {
    ZonescopeError::ZoneDatasetUnavailable { path: PathBuf::from(path), reason }
}

/// Zone envelope keyed by dataset position
#[derive(Debug, Clone, PartialEq)]
struct ZoneEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Answers which zones a polygon intersects
///
/// Candidates come from an R-tree over zone envelopes. The exact predicate
/// runs on candidates only, and results are reported in dataset order.
pub struct ZoneIntersectionIndex {
    zones: Vec<Zone>,
    tree: RTree<ZoneEnvelope>,
    mode: IntersectionMode,
}

impl ZoneIntersectionIndex {
    pub fn new(dataset: ZoneDataset, mode: IntersectionMode) -> Self {
        let envelopes: Vec<ZoneEnvelope> = dataset
            .zones
            .iter()
            .enumerate()
            .filter_map(|(position, zone)| {
                multi_polygon_envelope(&zone.geometry).map(|envelope| ZoneEnvelope { position, envelope })
            })
            .collect();

        Self {
            zones: dataset.zones,
            tree: RTree::bulk_load(envelopes),
            mode,
        }
    }

    /// Names of the zones the polygon intersects, in dataset order
    pub fn intersecting(&self, polygon: &Polygon) -> Vec<String> {
        let Some(bbox) = polygon.bounding_box() else {
            return Vec::new();
        };

        let mut candidates: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&bbox_envelope(&bbox))
            .map(|entry| entry.position)
            .collect();
        candidates.sort_unstable();

        let query = polygon.to_geo();
        candidates
            .into_iter()
            .filter(|&position| polygon_intersects_zone(&query, &self.zones[position].geometry, self.mode))
            .map(|position| self.zones[position].name.clone())
            .collect()
    }

    pub fn mode(&self) -> IntersectionMode {
        self.mode
    }

    /// The zones as a FeatureCollection with a `name` property per feature
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .zones
            .iter()
            .map(|zone| {
                let mut feature = Feature::from(geojson::Geometry::new(geojson::Value::from(&zone.geometry)));
                feature.set_property("name", zone.name.clone());
                feature
            })
            .collect();

        FeatureCollection { bbox: None, features, foreign_members: None }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // "North" is listed before "Alpha" so ordering by name would be visible
    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "North"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0], [0.0, 1.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Alpha"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Far"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[50.0, 50.0], [51.0, 50.0], [51.0, 51.0], [50.0, 50.0]]]
                }
            }
        ]
    }"#;

    fn square(min_x: f64, min_y: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            [min_x, min_y],
            [min_x + size, min_y],
            [min_x + size, min_y + size],
            [min_x, min_y + size],
            [min_x, min_y],
        ])
    }

    fn index(mode: IntersectionMode) -> ZoneIntersectionIndex {
        ZoneIntersectionIndex::new(ZoneDataset::from_geojson_str(ZONES).unwrap(), mode)
    }

    #[test]
    fn test_parse_dataset() {
        let dataset = ZoneDataset::from_geojson_str(ZONES).unwrap();
        let names: Vec<&str> = dataset.zones().iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["North", "Alpha", "Far"]);

        let bbox = dataset.zones()[2].bounding_box().unwrap();
        assert_eq!(bbox, BoundingBox::new(50.0, 50.0, 51.0, 51.0));
    }

    #[test]
    fn test_results_follow_dataset_order() {
        let index = index(IntersectionMode::Touching);

        // Straddles both the Alpha and North squares
        let zones = index.intersecting(&square(0.25, 0.5, 1.0));
        assert_eq!(zones, vec!["North".to_string(), "Alpha".to_string()]);
    }

    #[test]
    fn test_disjoint_polygon_has_no_zones() {
        let index = index(IntersectionMode::Touching);
        assert!(index.intersecting(&square(10.0, 10.0, 1.0)).is_empty());
        assert!(index.intersecting(&Polygon::new(vec![])).is_empty());
    }

    #[test]
    fn test_shared_edge_counts_only_when_touching() {
        // Shares the x = 1 edge with Alpha and North
        let neighbor = square(1.0, 0.25, 0.5);

        let touching = index(IntersectionMode::Touching).intersecting(&neighbor);
        assert_eq!(touching, vec!["Alpha".to_string()]);

        let interior = index(IntersectionMode::InteriorOverlap).intersecting(&neighbor);
        assert!(interior.is_empty());
    }

    #[test]
    fn test_envelope_hit_without_geometric_contact() {
        // Inside Far's bounding box but outside its triangle
        let index = index(IntersectionMode::Touching);
        assert!(index.intersecting(&square(50.1, 50.7, 0.1)).is_empty());
        assert_eq!(index.intersecting(&square(50.7, 50.1, 0.1)), vec!["Far".to_string()]);
    }

    #[test]
    fn test_feature_collection_keeps_names_and_order() {
        let collection = index(IntersectionMode::Touching).to_feature_collection();
        let names: Vec<&str> = collection
            .features
            .iter()
            .filter_map(|feature| feature.property("name").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(names, vec!["North", "Alpha", "Far"]);

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "MultiPolygon");

        // The emitted document parses back into the same zones
        let reparsed = ZoneDataset::from_geojson_str(&json.to_string()).unwrap();
        assert_eq!(reparsed.len(), 3);
    }

    #[test]
    fn test_feature_without_name_is_rejected() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
            }]
        }"#;

        let err = ZoneDataset::from_geojson_str(content).unwrap_err();
        assert!(matches!(err, ZonescopeError::ZoneDatasetUnavailable { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_point_zone_is_rejected() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Pin"},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            }]
        }"#;

        let err = ZoneDataset::from_geojson_str(content).unwrap_err();
        assert!(matches!(err, ZonescopeError::ZoneDatasetUnavailable { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ZONES.as_bytes()).unwrap();

        let dataset = ZoneDataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ZoneDataset::load("/nonexistent/zones.geojson").unwrap_err();
        match err {
            ZonescopeError::ZoneDatasetUnavailable { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/zones.geojson"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json() {
        let err = ZoneDataset::from_geojson_str("{not json").unwrap_err();
        assert!(matches!(err, ZonescopeError::ZoneDatasetUnavailable { .. }));
    }
}
