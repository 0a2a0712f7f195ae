//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in the coordinates of some CRS.
///
/// The values are kept in the order the service advertised them; for WMS
/// 1.3.0 with a geographic CRS that means `min_x` may hold a latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Format as a KVP BBOX parameter value.
    pub fn to_kvp_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kvp_string_uses_shortest_float_form() {
        let bbox = BoundingBox::new(10.0, 10.5, 51.0, 51.25);
        assert_eq!(bbox.to_kvp_string(), "10,10.5,51,51.25");
    }

    #[test]
    fn test_extent() {
        let bbox = BoundingBox::new(-125.0, 24.0, -66.0, 50.0);
        assert_eq!(bbox.width(), 59.0);
        assert_eq!(bbox.height(), 26.0);
    }
}
