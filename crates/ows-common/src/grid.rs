//! Addressable geometry of a remote raster.

use serde::{Deserialize, Serialize};

use crate::error::{OwsError, OwsResult};
use crate::BoundingBox;

/// Cell counts, CRS and extent of a coverage as advertised by the service.
///
/// Resolution is derived, never stored, and is strictly positive on both
/// axes for any value that passed [`GridReference::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridReference {
    /// Number of cells in X direction
    pub width: usize,
    /// Number of cells in Y direction
    pub height: usize,
    /// CRS identifier, e.g. "EPSG:28992"
    pub crs: String,
    /// Full extent of the coverage
    pub bbox: BoundingBox,
}

impl GridReference {
    pub fn new(
        width: usize,
        height: usize,
        crs: impl Into<String>,
        bbox: BoundingBox,
    ) -> OwsResult<Self> {
        let grid = Self {
            width,
            height,
            crs: crs.into(),
            bbox,
        };

        if width == 0 || height == 0 {
            return Err(OwsError::InvalidGrid(format!(
                "grid has {}x{} cells",
                width, height
            )));
        }
        let (resx, resy) = grid.resolution();
        if !(resx > 0.0 && resy > 0.0) || !resx.is_finite() || !resy.is_finite() {
            return Err(OwsError::InvalidGrid(format!(
                "non-positive resolution ({}, {}) for bbox {:?}",
                resx, resy, bbox
            )));
        }

        Ok(grid)
    }

    /// Per-cell size `(resx, resy)` in CRS units.
    pub fn resolution(&self) -> (f64, f64) {
        (
            self.bbox.width() / self.width as f64,
            self.bbox.height() / self.height as f64,
        )
    }

    /// Offset a world coordinate so the grid's low corner becomes the origin.
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.bbox.min_x, y - self.bbox.min_y)
    }

    /// World coordinate of a (possibly out-of-range) cell corner.
    pub fn cell_corner(&self, i: i64, j: i64) -> (f64, f64) {
        let (resx, resy) = self.resolution();
        (
            i as f64 * resx + self.bbox.min_x,
            j as f64 * resy + self.bbox.min_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution() {
        let grid =
            GridReference::new(200, 100, "EPSG:4326", BoundingBox::new(0.0, 0.0, 100.0, 25.0))
                .unwrap();
        assert_eq!(grid.resolution(), (0.5, 0.25));
    }

    #[test]
    fn test_rejects_zero_extent() {
        let result = GridReference::new(10, 10, "EPSG:4326", BoundingBox::new(5.0, 0.0, 5.0, 10.0));
        assert!(matches!(result, Err(OwsError::InvalidGrid(_))));
    }

    #[test]
    fn test_rejects_inverted_extent() {
        let result = GridReference::new(10, 10, "EPSG:4326", BoundingBox::new(0.0, 10.0, 10.0, 0.0));
        assert!(matches!(result, Err(OwsError::InvalidGrid(_))));
    }

    #[test]
    fn test_rejects_zero_cells() {
        let result = GridReference::new(0, 10, "EPSG:4326", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(result, Err(OwsError::InvalidGrid(_))));
    }

    #[test]
    fn test_local_and_corner() {
        let grid = GridReference::new(
            100,
            100,
            "EPSG:28992",
            BoundingBox::new(1000.0, 2000.0, 1100.0, 2100.0),
        )
        .unwrap();
        assert_eq!(grid.to_local(1010.0, 2020.0), (10.0, 20.0));
        assert_eq!(grid.cell_corner(10, 20), (1010.0, 2020.0));
    }
}
