//! Structural validation of GeoJSON geometries
//!
//! The GeoJSON parser accepts any nesting of numeric arrays; this module
//! checks the geometric rules the parser does not: finite positions, line
//! lengths, and closed polygon rings with at least four positions.

use geojson::{GeoJson, Value};

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent decoding
    pub errors: Vec<String>,

    /// Warnings that don't prevent decoding
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn error(&mut self, location: &str, reason: impl Into<String>) {
        self.errors.push(format!("{}: {}", location, reason.into()));
    }
}

/// Validate every geometry in a parsed document
pub fn validate_document(document: &GeoJson) -> FormatValidation {
    let mut validation = FormatValidation::default();

    match document {
        GeoJson::FeatureCollection(fc) => {
            if fc.features.is_empty() {
                validation.warnings.push("FeatureCollection has no features".to_string());
            }
            for (i, feature) in fc.features.iter().enumerate() {
                match &feature.geometry {
                    Some(geometry) => {
                        validate_value(&geometry.value, &format!("features[{}]", i), &mut validation)
                    }
                    None => validation.warnings.push(format!("features[{}] has no geometry", i)),
                }
            }
        }
        GeoJson::Feature(feature) => match &feature.geometry {
            Some(geometry) => validate_value(&geometry.value, "feature", &mut validation),
            None => validation.warnings.push("feature has no geometry".to_string()),
        },
        GeoJson::Geometry(geometry) => validate_value(&geometry.value, "geometry", &mut validation),
    }

    validation
}

fn validate_value(value: &Value, location: &str, validation: &mut FormatValidation) {
    match value {
        Value::Point(position) => validate_position(position, location, validation),
        Value::MultiPoint(points) => {
            for (i, position) in points.iter().enumerate() {
                validate_position(position, &format!("{}[{}]", location, i), validation);
            }
        }
        Value::LineString(line) => validate_line(line, location, validation),
        Value::MultiLineString(lines) => {
            for (i, line) in lines.iter().enumerate() {
                validate_line(line, &format!("{}[{}]", location, i), validation);
            }
        }
        Value::Polygon(rings) => validate_polygon(rings, location, validation),
        Value::MultiPolygon(polygons) => {
            for (i, rings) in polygons.iter().enumerate() {
                validate_polygon(rings, &format!("{}[{}]", location, i), validation);
            }
        }
        Value::GeometryCollection(geometries) => {
            for (i, geometry) in geometries.iter().enumerate() {
                validate_value(&geometry.value, &format!("{}.geometries[{}]", location, i), validation);
            }
        }
    }
}

fn validate_position(position: &[f64], location: &str, validation: &mut FormatValidation) {
    if position.len() < 2 {
        validation.error(location, format!("position needs 2 values, found {}", position.len()));
    } else if !position.iter().all(|v| v.is_finite()) {
        validation.error(location, "coordinates must be finite");
    }
}

fn validate_line(line: &[Vec<f64>], location: &str, validation: &mut FormatValidation) {
    if line.len() < 2 {
        validation.error(location, format!("LineString must have at least 2 positions, found {}", line.len()));
    }
    for (i, position) in line.iter().enumerate() {
        validate_position(position, &format!("{}[{}]", location, i), validation);
    }
}

fn validate_polygon(rings: &[Vec<Vec<f64>>], location: &str, validation: &mut FormatValidation) {
    if rings.is_empty() {
        validation.error(location, "Polygon has no rings");
    }

    for (i, ring) in rings.iter().enumerate() {
        let ring_location =
            if i == 0 { format!("{} exterior", location) } else { format!("{} interior[{}]", location, i - 1) };

        if ring.len() < 4 {
            validation.error(
                &ring_location,
                format!("ring must have at least 4 positions, found {}", ring.len()),
            );
        }

        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                validation.error(&ring_location, "ring must be closed (first position == last position)");
            }
        }

        for (j, position) in ring.iter().enumerate() {
            validate_position(position, &format!("{}[{}]", ring_location, j), validation);
        }
    }
}

/// Every position in the document, in document order
pub fn document_positions(document: &GeoJson) -> Vec<[f64; 2]> {
    let mut positions = Vec::new();
    match document {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_positions(&geometry.value, &mut positions);
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_positions(&geometry.value, &mut positions);
            }
        }
        GeoJson::Geometry(geometry) => collect_positions(&geometry.value, &mut positions),
    }
    positions
}

fn collect_positions(value: &Value, out: &mut Vec<[f64; 2]>) {
    fn push(out: &mut Vec<[f64; 2]>, position: &[f64]) {
        if let [x, y, ..] = position {
            out.push([*x, *y]);
        }
    }

    match value {
        Value::Point(position) => push(out, position),
        Value::MultiPoint(points) | Value::LineString(points) => {
            points.iter().for_each(|p| push(out, p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(|p| push(out, p))
        }
        Value::MultiPolygon(polygons) => {
            polygons.iter().flatten().flatten().for_each(|p| push(out, p))
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_positions(&geometry.value, out);
            }
        }
    }
}
