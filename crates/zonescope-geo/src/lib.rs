//! Zonescope Geo - Measurements and restricted-zone intersection
//!
//! This crate computes geodesic area and perimeter of drawn polygons and
//! answers which restricted zones a polygon intersects.

pub mod metrics;
pub mod spatial;
pub mod zones;

pub use metrics::{area, boundary, measure, perimeter};
pub use zones::{Zone, ZoneDataset, ZoneIntersectionIndex};
