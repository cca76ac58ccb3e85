//! Geodesic measurements of drawn polygons
//!
//! Coordinates are longitude/latitude, so flat-plane formulas would report
//! square degrees. Area uses the Chamberlain–Duquette spherical-excess
//! approximation on the WGS84 equatorial radius; perimeter sums haversine
//! great-circle distances between consecutive vertices.

use geo::{ChamberlainDuquetteArea, Distance, Haversine, Point};
use zonescope_core::models::{Measurement, Polygon};

/// Positions in the smallest closed ring that encloses an area: three
/// distinct vertices plus the closing one
pub const MIN_RING_POSITIONS: usize = 4;

/// Area and perimeter of a polygon. Never fails: degenerate rings measure
/// zero area with a normally computed perimeter.
pub fn measure(polygon: &Polygon) -> Measurement {
    let ring = boundary(polygon);
    Measurement { area: ring_area(&ring), perimeter: ring_length(&ring) }
}

/// Unsigned geodesic area in square meters
pub fn area(polygon: &Polygon) -> f64 {
    ring_area(&boundary(polygon))
}

/// Geodesic perimeter in meters, closing the ring if needed
pub fn perimeter(polygon: &Polygon) -> f64 {
    ring_length(&boundary(polygon))
}

/// Normalized boundary: consecutive duplicate vertices dropped, ring closed
pub fn boundary(polygon: &Polygon) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = Vec::with_capacity(polygon.len() + 1);
    for coord in polygon.exterior() {
        if ring.last() != Some(coord) {
            ring.push(*coord);
        }
    }
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
        if first != *last {
            ring.push(first);
        }
    }
    ring
}

fn ring_area(ring: &[[f64; 2]]) -> f64 {
    if ring.len() < MIN_RING_POSITIONS {
        return 0.0;
    }
    let area = Polygon::new(ring.to_vec()).to_geo().chamberlain_duquette_unsigned_area();
    if area.is_finite() {
        area
    } else {
        0.0
    }
}

fn ring_length(ring: &[[f64; 2]]) -> f64 {
    // fold from +0.0: an empty f64 sum is -0.0
    ring.windows(2)
        .map(|pair| Haversine.distance(Point::from(pair[0]), Point::from(pair[1])))
        .fold(0.0, |total, leg| total + leg)
}
