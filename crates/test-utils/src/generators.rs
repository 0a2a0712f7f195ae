//! Test data generators for synthetic rasters.
//!
//! These generators create predictable, verifiable patterns so tests can
//! check exactly which cell a sample came from.

use std::io::Cursor;

use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// GDAL's private TIFF tag for the nodata value.
const GDAL_NODATA: u16 = 42113;

/// Creates a test grid with predictable values.
///
/// Rows are stored top row first, as a GeoTIFF stores them, and each cell
/// holds `row_from_bottom * 1000 + col`. A transect sample can therefore be
/// traced back to its cell by reading the value.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(3, 2);
/// assert_eq!(grid, vec![1000.0, 1001.0, 1002.0, 0.0, 1.0, 2.0]);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let from_bottom = height - 1 - row;
        for col in 0..width {
            data.push((from_bottom * 1000 + col) as f32);
        }
    }
    data
}

/// Encode a single-band `f32` GeoTIFF in memory.
///
/// `data` is row-major, top row first. When `nodata` is given it is written
/// to the GDAL nodata tag the way GDAL does (ASCII).
///
/// # Panics
///
/// Panics if `data.len() != width * height`.
pub fn geotiff_bytes(width: u32, height: u32, data: &[f32], nodata: Option<f64>) -> Vec<u8> {
    assert_eq!(data.len(), (width * height) as usize, "grid size mismatch");

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).expect("create tiff encoder");
        let mut image = encoder
            .new_image::<Gray32Float>(width, height)
            .expect("create tiff image");
        if let Some(value) = nodata {
            image
                .encoder()
                .write_tag(Tag::Unknown(GDAL_NODATA), value.to_string().as_str())
                .expect("write nodata tag");
        }
        image.write_data(data).expect("write tiff data");
    }
    cursor.into_inner()
}
