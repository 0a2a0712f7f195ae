//! Transect sampling against OGC Web Coverage Services.
//!
//! A transect request goes through four stages, each a separate value:
//!
//! 1. [`TransectRequest`] - the caller's line, sampling density and output mode
//! 2. [`TransectPlan`] - the cell window covering the line and the sample points
//! 3. [`Raster`] - the downloaded window decoded into memory
//! 4. [`TransectResult`] - the sampled profile or the whole window
//!
//! [`TransectSampler`] drives the stages against a live service.

pub mod error;
pub mod orientation;
pub mod plan;
pub mod profile;
pub mod raster;
pub mod sampler;
pub mod wcs;
pub mod window;

pub use error::TransectError;
pub use orientation::{Orientation, PixelSpan};
pub use plan::{linspace, TransectPlan, TransectRequest};
pub use profile::{Profile, Sample};
pub use raster::{Raster, RasterError};
pub use sampler::{sample_raster, TransectResult, TransectSampler};
pub use wcs::{CoverageDownload, WcsClient};
pub use window::CoverageWindow;
