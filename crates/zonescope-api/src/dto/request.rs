use serde::Deserialize;
use zonescope_core::models::Polygon;

/// Drawn polygon submitted for analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Exterior ring as `[longitude, latitude]` pairs
    pub coordinates: Vec<[f64; 2]>,
}

impl AnalyzeRequest {
    pub fn into_polygon(self) -> Polygon {
        Polygon::new(self.coordinates)
    }
}

/// Place search query string
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}
