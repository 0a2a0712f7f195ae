//! Drawing direction of a transect and the pixel indices it implies.
//!
//! A line may be drawn in any direction. The downloaded raster is always
//! indexed low-to-high, so the endpoint lying on the high side of an axis is
//! assigned the far edge of its cell (`floor + 1`) and the other endpoint the
//! near edge (`floor`).

use ows_common::Point;
use serde::Serialize;

use crate::error::TransectError;

/// Which axes run high-to-low from the line's start to its end.
///
/// An axis counts as flipped when the start coordinate is greater than *or
/// equal to* the end coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Bottom-left to top-right
    Forward,
    /// Bottom-right to top-left
    FlipX,
    /// Top-left to bottom-right
    FlipY,
    /// Top-right to bottom-left
    Reversed,
}

impl Orientation {
    pub fn from_flags(flip_x: bool, flip_y: bool) -> Self {
        match (flip_x, flip_y) {
            (false, false) => Orientation::Forward,
            (true, false) => Orientation::FlipX,
            (false, true) => Orientation::FlipY,
            (true, true) => Orientation::Reversed,
        }
    }

    /// Orientation of the segment from `start` to `end`.
    pub fn of_segment(start: Point, end: Point) -> Self {
        Self::from_flags(start.x >= end.x, start.y >= end.y)
    }

    pub fn flip_x(&self) -> bool {
        matches!(self, Orientation::FlipX | Orientation::Reversed)
    }

    pub fn flip_y(&self) -> bool {
        matches!(self, Orientation::FlipY | Orientation::Reversed)
    }

    /// Assign integer pixel indices to both endpoints.
    ///
    /// `start` and `end` are grid-local coordinates (low corner at the
    /// origin) and `resolution` the per-cell size.
    pub fn assign_pixels(
        &self,
        start: (f64, f64),
        end: (f64, f64),
        resolution: (f64, f64),
    ) -> Result<PixelSpan, TransectError> {
        let (resx, resy) = resolution;
        let (start_x, end_x) = assign_axis(
            self.flip_x(),
            cell_index(start.0, resx)?,
            cell_index(end.0, resx)?,
        )?;
        let (start_y, end_y) = assign_axis(
            self.flip_y(),
            cell_index(start.1, resy)?,
            cell_index(end.1, resy)?,
        )?;

        Ok(PixelSpan {
            start: (start_x, start_y),
            end: (end_x, end_y),
        })
    }
}

/// Floor division of a grid-local coordinate by the cell size.
///
/// Fails when the cell number does not fit an `i64`.
pub(crate) fn cell_index(local: f64, resolution: f64) -> Result<i64, TransectError> {
    let cell = (local / resolution).floor();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if cell.is_finite() && cell >= i64::MIN as f64 && cell < i64::MAX as f64 {
        Ok(cell as i64)
    } else {
        Err(out_of_range(local))
    }
}

/// Index of the far edge of the cell holding `local`.
pub(crate) fn far_edge(local: f64, resolution: f64) -> Result<i64, TransectError> {
    cell_index(local, resolution)?
        .checked_add(1)
        .ok_or_else(|| out_of_range(local))
}

fn out_of_range(local: f64) -> TransectError {
    TransectError::InvalidRequest(format!(
        "coordinate offset {} is out of the grid's index range",
        local
    ))
}

fn assign_axis(flipped: bool, start_cell: i64, end_cell: i64) -> Result<(i64, i64), TransectError> {
    let overflow = || TransectError::InvalidRequest("cell index overflow".to_string());
    if flipped {
        Ok((start_cell.checked_add(1).ok_or_else(overflow)?, end_cell))
    } else {
        Ok((start_cell, end_cell.checked_add(1).ok_or_else(overflow)?))
    }
}

/// Pixel indices assigned to a line's start and end point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelSpan {
    pub start: (i64, i64),
    pub end: (i64, i64),
}

impl PixelSpan {
    /// Lowest index on each axis.
    pub fn low(&self) -> (i64, i64) {
        (self.start.0.min(self.end.0), self.start.1.min(self.end.1))
    }

    /// Highest index on each axis.
    pub fn high(&self) -> (i64, i64) {
        (self.start.0.max(self.end.0), self.start.1.max(self.end.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_segment() {
        let a = Point::new(10.0, 10.0);
        let b = Point::new(50.0, 50.0);
        assert_eq!(Orientation::of_segment(a, b), Orientation::Forward);
        assert_eq!(Orientation::of_segment(b, a), Orientation::Reversed);
        assert_eq!(
            Orientation::of_segment(Point::new(50.0, 10.0), Point::new(10.0, 50.0)),
            Orientation::FlipX
        );
        assert_eq!(
            Orientation::of_segment(Point::new(10.0, 50.0), Point::new(50.0, 10.0)),
            Orientation::FlipY
        );
    }

    #[test]
    fn test_equal_coordinates_count_as_flipped() {
        let o = Orientation::of_segment(Point::new(5.0, 1.0), Point::new(5.0, 9.0));
        assert_eq!(o, Orientation::FlipX);
    }

    #[test]
    fn test_low_never_exceeds_high_in_any_orientation() {
        let cases = [
            ((10.2, 10.7), (50.1, 50.9)),
            ((50.1, 50.9), (10.2, 10.7)),
            ((50.1, 10.7), (10.2, 50.9)),
            ((10.2, 50.9), (50.1, 10.7)),
            ((3.5, 3.5), (3.6, 3.7)),
        ];

        for (start, end) in cases {
            let orientation = Orientation::of_segment(
                Point::new(start.0, start.1),
                Point::new(end.0, end.1),
            );
            let span = orientation.assign_pixels(start, end, (1.0, 1.0)).unwrap();
            let (lx, ly) = span.low();
            let (hx, hy) = span.high();
            assert!(lx < hx, "{:?}: x {} !< {}", orientation, lx, hx);
            assert!(ly < hy, "{:?}: y {} !< {}", orientation, ly, hy);
        }
    }

    #[test]
    fn test_reversed_maps_start_to_high_indices() {
        let span = Orientation::Reversed
            .assign_pixels((50.0, 50.0), (10.0, 10.0), (1.0, 1.0))
            .unwrap();
        assert_eq!(span.start, (51, 51));
        assert_eq!(span.end, (10, 10));
    }

    #[test]
    fn test_flip_x_mixes_axes() {
        let span = Orientation::FlipX
            .assign_pixels((50.0, 10.0), (10.0, 50.0), (1.0, 1.0))
            .unwrap();
        assert_eq!(span.start, (51, 10));
        assert_eq!(span.end, (10, 51));
    }

    #[test]
    fn test_forward_with_coarse_resolution() {
        let span = Orientation::Forward
            .assign_pixels((25.0, 5.0), (75.0, 95.0), (10.0, 10.0))
            .unwrap();
        assert_eq!(span.low(), (2, 0));
        assert_eq!(span.high(), (8, 10));
    }

    #[test]
    fn test_huge_offset_is_rejected() {
        assert!(cell_index(1e300, 1.0).is_err());
        assert!(cell_index(-1e300, 0.01).is_err());
        assert_eq!(cell_index(-0.5, 1.0).unwrap(), -1);

        let result = Orientation::Forward.assign_pixels((0.0, 0.0), (1e300, 0.5), (0.01, 0.01));
        assert!(matches!(result, Err(TransectError::InvalidRequest(_))));
    }
}
