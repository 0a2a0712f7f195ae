//! The minimal cell window of a coverage that covers a line.

use ows_common::{BoundingBox, GridReference, Point};
use serde::Serialize;

use crate::error::TransectError;
use crate::orientation::{cell_index, far_edge};

/// Half-open cell ranges `[x0, x1)` and `[y0, y1)` in grid index space.
///
/// Indices count from the grid's low corner and may fall outside the
/// coverage when the line does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageWindow {
    pub x: (i64, i64),
    pub y: (i64, i64),
}

impl CoverageWindow {
    /// Smallest window covering both endpoints, independent of drawing
    /// direction. The far cell is included on each axis, so a line inside a
    /// single cell still yields a 1x1 window.
    ///
    /// Fails when an index or the window extent does not fit the index type.
    pub fn covering(grid: &GridReference, a: Point, b: Point) -> Result<Self, TransectError> {
        let (resx, resy) = grid.resolution();
        let (low_x, low_y) = grid.to_local(a.x.min(b.x), a.y.min(b.y));
        let (high_x, high_y) = grid.to_local(a.x.max(b.x), a.y.max(b.y));

        let window = Self {
            x: (cell_index(low_x, resx)?, far_edge(high_x, resx)?),
            y: (cell_index(low_y, resy)?, far_edge(high_y, resy)?),
        };
        if window.x.1.checked_sub(window.x.0).is_none()
            || window.y.1.checked_sub(window.y.0).is_none()
        {
            return Err(TransectError::InvalidRequest(format!(
                "window {:?} x {:?} is too large",
                window.x, window.y
            )));
        }
        Ok(window)
    }

    /// True when the window shares at least one cell with the coverage.
    pub fn intersects(&self, grid: &GridReference) -> bool {
        let (cols, rows) = (grid.width as i64, grid.height as i64);
        self.x.0 < cols && self.x.1 > 0 && self.y.0 < rows && self.y.1 > 0
    }

    /// Number of cells in X direction.
    pub fn width(&self) -> usize {
        (self.x.1 - self.x.0) as usize
    }

    /// Number of cells in Y direction.
    pub fn height(&self) -> usize {
        (self.y.1 - self.y.0) as usize
    }

    /// Lowest cell index on each axis.
    pub fn low(&self) -> (i64, i64) {
        (self.x.0, self.y.0)
    }

    /// World extent of the window, snapped to cell edges.
    pub fn bbox(&self, grid: &GridReference) -> BoundingBox {
        let (min_x, min_y) = grid.cell_corner(self.x.0, self.y.0);
        let (max_x, max_y) = grid.cell_corner(self.x.1, self.y.1);
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }
}
