//! Line geometry parsed from well-known text.

use serde::{Deserialize, Serialize};

use crate::error::{OwsError, OwsResult};

/// A 2D point in the coordinates of the grid being sampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A LINESTRING with at least two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    vertices: Vec<Point>,
}

impl LineGeometry {
    /// Build a line from vertices, rejecting anything shorter than two points.
    pub fn new(vertices: Vec<Point>) -> OwsResult<Self> {
        if vertices.len() < 2 {
            return Err(OwsError::InvalidWkt(format!(
                "LINESTRING needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Parse a WKT LINESTRING.
    ///
    /// Accepts `LINESTRING(x y, x y, ...)` and `LINESTRING (x y, ...)`, in any
    /// letter case. Z/M ordinates are not supported.
    pub fn from_wkt(wkt: &str) -> OwsResult<Self> {
        let wkt = wkt.trim();
        let upper = wkt.to_uppercase();

        let tag = upper.split('(').next().unwrap_or("").trim();
        if tag != "LINESTRING" {
            return Err(OwsError::InvalidWkt(format!(
                "Expected LINESTRING, got '{}'",
                tag
            )));
        }

        let start = wkt
            .find('(')
            .ok_or_else(|| OwsError::InvalidWkt("Missing opening parenthesis".to_string()))?;
        let end = wkt
            .rfind(')')
            .ok_or_else(|| OwsError::InvalidWkt("Missing closing parenthesis".to_string()))?;

        if end <= start {
            return Err(OwsError::InvalidWkt("Invalid parenthesis order".to_string()));
        }

        let vertices = wkt[start + 1..end]
            .split(',')
            .map(parse_vertex)
            .collect::<OwsResult<Vec<_>>>()?;

        Self::new(vertices)
    }

    /// First vertex.
    pub fn start(&self) -> Point {
        self.vertices[0]
    }

    /// Last vertex.
    pub fn end(&self) -> Point {
        self.vertices[self.vertices.len() - 1]
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// True when the first and last vertex coincide.
    pub fn is_degenerate(&self) -> bool {
        self.start() == self.end()
    }
}

fn parse_vertex(raw: &str) -> OwsResult<Point> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(OwsError::InvalidWkt(format!(
            "Expected 'x y' vertex, got '{}'",
            raw.trim()
        )));
    }

    let x: f64 = parts[0]
        .parse()
        .map_err(|_| OwsError::InvalidCoordinate(parts[0].to_string()))?;
    let y: f64 = parts[1]
        .parse()
        .map_err(|_| OwsError::InvalidCoordinate(parts[1].to_string()))?;

    if !x.is_finite() || !y.is_finite() {
        return Err(OwsError::InvalidCoordinate(raw.trim().to_string()));
    }

    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_linestring_with_space() {
        let line = LineGeometry::from_wkt("LINESTRING (10 10, 50 50)").unwrap();
        assert_eq!(line.start(), Point::new(10.0, 10.0));
        assert_eq!(line.end(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_parse_linestring_lowercase_multi_vertex() {
        let line = LineGeometry::from_wkt("linestring(0 0,1.5 2,-3 4.25)").unwrap();
        assert_eq!(line.vertices().len(), 3);
        assert_eq!(line.end(), Point::new(-3.0, 4.25));
    }

    #[test]
    fn test_rejects_point_wkt() {
        assert!(matches!(
            LineGeometry::from_wkt("POINT(1 2)"),
            Err(OwsError::InvalidWkt(_))
        ));
    }

    #[test]
    fn test_rejects_single_vertex() {
        assert!(matches!(
            LineGeometry::from_wkt("LINESTRING(1 2)"),
            Err(OwsError::InvalidWkt(_))
        ));
    }

    #[test]
    fn test_rejects_bad_number() {
        assert_eq!(
            LineGeometry::from_wkt("LINESTRING(1 2, x 4)"),
            Err(OwsError::InvalidCoordinate("x".to_string()))
        );
    }

    #[test]
    fn test_endpoint_distance_and_degenerate() {
        let line = LineGeometry::from_wkt("LINESTRING(0 0, 3 4)").unwrap();
        assert_eq!(line.start().distance_to(&line.end()), 5.0);
        assert!(!line.is_degenerate());

        let dot = LineGeometry::from_wkt("LINESTRING(2 2, 2 2)").unwrap();
        assert!(dot.is_degenerate());
    }
}
