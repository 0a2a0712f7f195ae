//! Request context and the sampling plan derived from it.

use ows_common::{BoundingBox, GridReference, LineGeometry, Point};
use serde::Serialize;
use tracing::debug;

use crate::error::TransectError;
use crate::orientation::{Orientation, PixelSpan};
use crate::window::CoverageWindow;

/// What the caller asked for. Immutable once built.
#[derive(Debug, Clone)]
pub struct TransectRequest {
    /// Line in the coverage's CRS; first and last vertex bound the segment
    pub line: LineGeometry,
    /// Samples per cell along the dominant axis
    pub sampling: usize,
    /// Return the whole downloaded window instead of a profile
    pub all_box: bool,
}

impl TransectRequest {
    /// Validate and build a request.
    ///
    /// Rejects a zero sampling density and lines whose first and last vertex
    /// coincide, since neither yields a meaningful window.
    pub fn new(line: LineGeometry, sampling: usize) -> Result<Self, TransectError> {
        if sampling == 0 {
            return Err(TransectError::InvalidRequest(
                "sampling density must be at least 1".to_string(),
            ));
        }
        if line.is_degenerate() {
            return Err(TransectError::InvalidRequest(format!(
                "line starts and ends at the same point ({}, {})",
                line.start().x,
                line.start().y
            )));
        }

        Ok(Self {
            line,
            sampling,
            all_box: false,
        })
    }

    /// Parse the line from WKT and build a request.
    pub fn from_wkt(wkt: &str, sampling: usize) -> Result<Self, TransectError> {
        Self::new(LineGeometry::from_wkt(wkt)?, sampling)
    }

    pub fn with_all_box(mut self, all_box: bool) -> Self {
        self.all_box = all_box;
        self
    }
}

/// Upper bound on sample points along one transect.
pub const MAX_SUBDIVISIONS: usize = 10_000_000;

/// Window to download and window-relative points to sample.
#[derive(Debug, Clone, Serialize)]
pub struct TransectPlan {
    pub orientation: Orientation,
    pub window: CoverageWindow,
    pub pixels: PixelSpan,
    /// World extent of the window, used for the GetCoverage request
    pub bbox: BoundingBox,
    /// Segment start in world coordinates
    pub start: Point,
    /// Segment end in world coordinates
    pub end: Point,
    /// Sample positions in window cell units, `(x, y)` with y counted from
    /// the bottom row
    pub points: Vec<(f64, f64)>,
}

impl TransectPlan {
    /// Plan a request against `grid`.
    ///
    /// Fails when the line's window lies wholly outside the coverage, which
    /// usually means the line is in another CRS, or when the window or the
    /// number of samples is too large to represent.
    pub fn new(grid: &GridReference, request: &TransectRequest) -> Result<Self, TransectError> {
        let start = request.line.start();
        let end = request.line.end();
        let (resx, resy) = grid.resolution();

        let orientation = Orientation::of_segment(start, end);
        let window = CoverageWindow::covering(grid, start, end)?;
        if !window.intersects(grid) {
            return Err(TransectError::InvalidRequest(format!(
                "line does not intersect the {}x{} cell coverage in {} (window x {:?}, y {:?})",
                grid.width, grid.height, grid.crs, window.x, window.y
            )));
        }

        let local_start = grid.to_local(start.x, start.y);
        let local_end = grid.to_local(end.x, end.y);
        let pixels = orientation.assign_pixels(local_start, local_end, (resx, resy))?;
        let (low_x, low_y) = pixels.low();

        let subdiv = request
            .sampling
            .checked_mul(window.width().max(window.height()))
            .filter(|&n| n <= MAX_SUBDIVISIONS)
            .ok_or_else(|| {
                TransectError::InvalidRequest(format!(
                    "{} cells at sampling {} exceeds {} samples",
                    window.width().max(window.height()),
                    request.sampling,
                    MAX_SUBDIVISIONS
                ))
            })?;
        let xs = linspace(
            local_start.0 / resx - low_x as f64,
            local_end.0 / resx - low_x as f64,
            subdiv,
        );
        let ys = linspace(
            local_start.1 / resy - low_y as f64,
            local_end.1 / resy - low_y as f64,
            subdiv,
        );

        debug!(
            ?orientation,
            x = ?window.x,
            y = ?window.y,
            subdiv,
            "Planned transect window"
        );

        Ok(Self {
            orientation,
            window,
            pixels,
            bbox: window.bbox(grid),
            start,
            end,
            points: xs.into_iter().zip(ys).collect(),
        })
    }

    /// Number of sample points.
    pub fn subdivisions(&self) -> usize {
        self.points.len()
    }
}

/// `num` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = end;
            values
        }
    }
}
