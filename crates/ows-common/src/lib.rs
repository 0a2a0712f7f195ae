//! Common types shared by the OGC administration tools.

pub mod bbox;
pub mod error;
pub mod exception;
pub mod geometry;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{OwsError, OwsResult};
pub use exception::{parse_exception_report, ServiceException};
pub use geometry::{LineGeometry, Point};
pub use grid::GridReference;
