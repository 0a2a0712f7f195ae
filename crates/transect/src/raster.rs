//! In-memory single-band raster decoded from GeoTIFF.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// GDAL's private TIFF tag holding the nodata value as ASCII.
pub const GDAL_NODATA_TAG: u16 = 42113;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to open raster: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode GeoTIFF: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Unsupported sample format")]
    UnsupportedSampleFormat,

    #[error("Raster is empty")]
    Empty,

    #[error("Raster has {actual} samples, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// First band of a raster as `f64`, row-major.
///
/// Row 0 is whatever the source delivered first; GeoTIFF stores the top row
/// first, [`Raster::flipped_vertically`] puts the bottom row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub nodata: Option<f64>,
    data: Vec<f64>,
}

impl Raster {
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f64>,
        nodata: Option<f64>,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty);
        }
        if data.len() != width * height {
            return Err(RasterError::SizeMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            nodata,
            data,
        })
    }

    /// Open a GeoTIFF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RasterError> {
        let file = File::open(path)?;
        Self::from_geotiff(BufReader::new(file))
    }

    /// Decode the first band of a GeoTIFF.
    pub fn from_geotiff<R: Read + Seek>(reader: R) -> Result<Self, RasterError> {
        let mut decoder = Decoder::new(reader)?;
        let (width, height) = decoder.dimensions()?;

        let nodata = decoder
            .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
            .ok()
            .and_then(|s| parse_nodata(&s));

        let samples_per_pixel = decoder
            .find_tag(Tag::SamplesPerPixel)?
            .map(|v| v.into_u16())
            .transpose()?
            .unwrap_or(1)
            .max(1) as usize;

        let values = match decoder.read_image()? {
            DecodingResult::U8(v) => widen(v, samples_per_pixel),
            DecodingResult::U16(v) => widen(v, samples_per_pixel),
            DecodingResult::U32(v) => widen(v, samples_per_pixel),
            DecodingResult::U64(v) => first_band(v, samples_per_pixel, |x| x as f64),
            DecodingResult::I8(v) => widen(v, samples_per_pixel),
            DecodingResult::I16(v) => widen(v, samples_per_pixel),
            DecodingResult::I32(v) => widen(v, samples_per_pixel),
            DecodingResult::I64(v) => first_band(v, samples_per_pixel, |x| x as f64),
            DecodingResult::F32(v) => widen(v, samples_per_pixel),
            DecodingResult::F64(v) => widen(v, samples_per_pixel),
            #[allow(unreachable_patterns)]
            _ => return Err(RasterError::UnsupportedSampleFormat),
        };

        Self::new(width as usize, height as usize, values, nodata)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.width)
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Reverse the row order.
    pub fn flipped_vertically(self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks(self.width).rev() {
            data.extend_from_slice(row);
        }
        Self { data, ..self }
    }

    /// Nearest-neighbour lookup at fractional array coordinates.
    ///
    /// Integer coordinates address cell centres (`x` = column, `y` = row).
    /// Positions outside the raster clamp to the nearest edge cell.
    pub fn sample_nearest(&self, x: f64, y: f64) -> f64 {
        let col = nearest_index(x, self.width);
        let row = nearest_index(y, self.height);
        self.get(row, col)
    }

    /// Replace the nodata sentinel (and NaN) by `None`.
    pub fn mask(&self, value: f64) -> Option<f64> {
        if value.is_nan() || self.nodata == Some(value) {
            None
        } else {
            Some(value)
        }
    }
}

fn nearest_index(coord: f64, len: usize) -> usize {
    let idx = (coord + 0.5).floor();
    if idx.is_nan() || idx <= 0.0 {
        0
    } else {
        (idx as usize).min(len - 1)
    }
}

fn parse_nodata(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(char::from(0)).trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        _ => trimmed.parse().ok(),
    }
}

fn widen<T: Into<f64> + Copy>(values: Vec<T>, samples_per_pixel: usize) -> Vec<f64> {
    first_band(values, samples_per_pixel, |x: T| x.into())
}

fn first_band<T: Copy>(values: Vec<T>, samples_per_pixel: usize, f: impl Fn(T) -> f64) -> Vec<f64> {
    values
        .into_iter()
        .step_by(samples_per_pixel)
        .map(f)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x2() -> Raster {
        // row 0: 1 2 3
        // row 1: 4 5 6
        Raster::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Some(-9999.0)).unwrap()
    }

    #[test]
    fn test_cell_centre_returns_cell_value() {
        let r = grid_3x2();
        assert_eq!(r.sample_nearest(0.0, 0.0), 1.0);
        assert_eq!(r.sample_nearest(2.0, 1.0), 6.0);
        assert_eq!(r.sample_nearest(1.0, 1.0), 5.0);
    }

    #[test]
    fn test_rounds_to_nearest_cell() {
        let r = grid_3x2();
        assert_eq!(r.sample_nearest(0.49, 0.2), 1.0);
        assert_eq!(r.sample_nearest(0.5, 0.2), 2.0);
        assert_eq!(r.sample_nearest(1.6, 0.7), 6.0);
    }

    #[test]
    fn test_out_of_bounds_clamps_to_edge() {
        let r = grid_3x2();
        assert_eq!(r.sample_nearest(-5.0, -3.0), 1.0);
        assert_eq!(r.sample_nearest(10.0, 0.0), 3.0);
        assert_eq!(r.sample_nearest(10.0, 10.0), 6.0);
        assert_eq!(r.sample_nearest(0.0, 42.0), 4.0);
    }

    #[test]
    fn test_flip_puts_bottom_row_first() {
        let r = grid_3x2().flipped_vertically();
        assert_eq!(r.rows().next(), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(r.get(1, 0), 1.0);
    }

    #[test]
    fn test_mask_nodata() {
        let r = grid_3x2();
        assert_eq!(r.mask(-9999.0), None);
        assert_eq!(r.mask(f64::NAN), None);
        assert_eq!(r.mask(0.0), Some(0.0));
        assert_eq!(r.mask(5.0), Some(5.0));
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            Raster::new(2, 2, vec![1.0; 3], None),
            Err(RasterError::SizeMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(Raster::new(0, 2, vec![], None), Err(RasterError::Empty)));
    }

    #[test]
    fn test_parse_nodata() {
        assert_eq!(parse_nodata("-9999\0"), Some(-9999.0));
        assert_eq!(parse_nodata(" 3.5 "), Some(3.5));
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert_eq!(parse_nodata("none"), None);
    }
}
