//! Publish directories of raster tiles as ImageMosaic layers.
//!
//! For every path three REST calls are issued in order: create the coverage
//! store, configure the mosaic, assign the default style. A failed call is
//! logged and recorded in the path's [`PublishReport`]; the remaining calls
//! and paths are still attempted.

pub mod config;
pub mod error;
pub mod naming;
pub mod payload;
pub mod publisher;
pub mod rest;

pub use config::{Credentials, PublishConfig};
pub use error::{PublishError, PublishResult};
pub use naming::derive_store_name;
pub use publisher::{
    MosaicPublisher, PlannedRequest, PublishReport, PublishStep, StepOutcome, StepReport,
};
pub use rest::{RestClient, RestResponse};
