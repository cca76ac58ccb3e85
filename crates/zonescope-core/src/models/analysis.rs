//! Analysis results for a drawn polygon

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Area and perimeter of a ring, in square meters and meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    pub area: f64,
    pub perimeter: f64,
}

/// Result of analyzing one drawn polygon
///
/// `intersecting_zones` follows the order of the zone dataset, not the
/// amount of overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub boundary: Vec<[f64; 2]>,
    pub area: f64,
    pub perimeter: f64,
    pub intersecting_zones: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(boundary: Vec<[f64; 2]>, measurement: Measurement, zones: Vec<String>) -> Self {
        Self {
            boundary,
            area: measurement.area,
            perimeter: measurement.perimeter,
            intersecting_zones: zones,
            created_at: Utc::now(),
        }
    }

    pub fn intersects_any_zone(&self) -> bool {
        !self.intersecting_zones.is_empty()
    }

    /// Presentation form with fixed two-decimal precision
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            coordinates: self.boundary.clone(),
            area: format!("{:.2}", self.area),
            perimeter: format!("{:.2}", self.perimeter),
            no_fly_zones: self.intersecting_zones.clone(),
        }
    }
}

/// Display-ready analysis summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub coordinates: Vec<[f64; 2]>,
    pub area: String,
    pub perimeter: String,
    pub no_fly_zones: Vec<String>,
}
