//! Canonical geometry types shared across the zonescope crates.
//!
//! Coordinates are `[longitude, latitude]` pairs, matching GeoJSON
//! position order.

use geo::algorithm::bounding_rect::BoundingRect;
use serde::{Deserialize, Serialize};

/// A drawn polygon: one closed ring of `[lon, lat]` positions.
///
/// The drawing surface guarantees closure and a minimum of four positions;
/// measurement code tolerates anything shorter instead of rejecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<[f64; 2]>,
}

impl Polygon {
    /// Create a polygon from its exterior ring
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self { exterior }
    }

    /// Exterior ring positions
    pub fn exterior(&self) -> &[[f64; 2]] {
        &self.exterior
    }

    /// Number of positions in the ring, closing position included
    pub fn len(&self) -> usize {
        self.exterior.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// Convert to a `geo` polygon for computation
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<geo::Coord<f64>> =
            self.exterior.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect();
        // LineString::new does not close the ring; Polygon::new does.
        geo::Polygon::new(geo::LineString::new(coords), vec![])
    }

    /// GeoJSON geometry for this polygon
    pub fn to_geojson(&self) -> geojson::Geometry {
        let ring: Vec<Vec<f64>> = self.exterior.iter().map(|c| vec![c[0], c[1]]).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }

    /// Bounding box of the ring, `None` for an empty ring
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.to_geo().bounding_rect().map(BoundingBox::from)
    }
}

/// Axis-aligned bounding box in layer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box covering all the given points
    pub fn from_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        points.into_iter().fold(None, |acc, [x, y]| {
            Some(match acc {
                None => Self::new(x, y, x, y),
                Some(b) => Self::new(b.min_x.min(x), b.min_y.min(y), b.max_x.max(x), b.max_y.max(y)),
            })
        })
    }

    pub fn center(&self) -> [f64; 2] {
        [(self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0]
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        BoundingBox::new(min.x, min.y, max.x, max.y)
    }
}

/// How a query polygon must meet a restricted zone to be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntersectionMode {
    /// Any shared point counts, including boundary-only contact
    #[default]
    Touching,
    /// Interiors must overlap; boundary-only contact is not reported
    InteriorOverlap,
}
