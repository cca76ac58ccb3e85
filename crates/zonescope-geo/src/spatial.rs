//! Spatial predicates between a drawn polygon and zone geometries

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::intersects::Intersects;
use geo::{MultiPolygon, Polygon, Relate};
use rstar::AABB;
use zonescope_core::models::{BoundingBox, IntersectionMode};

/// Check whether a polygon intersects a zone under the given mode
///
/// `Touching` counts shared boundary points as an intersection.
/// `InteriorOverlap` requires the interiors to overlap.
pub fn polygon_intersects_zone(polygon: &Polygon<f64>, zone: &MultiPolygon<f64>, mode: IntersectionMode) -> bool {
    match mode {
        IntersectionMode::Touching => polygon.intersects(zone),
        IntersectionMode::InteriorOverlap => {
            let matrix = polygon.relate(zone);
            matrix.is_intersects() && !matrix.is_touches()
        }
    }
}

/// R-tree envelope for a zone geometry
pub fn multi_polygon_envelope(geometry: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    geometry
        .bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

pub fn bbox_envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}
