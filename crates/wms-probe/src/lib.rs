//! Health probes for the layers of a WMS 1.3.0 endpoint.
//!
//! Connects once, lists every named layer from the capabilities document and
//! issues a tiny GetMap (and optionally GetFeatureInfo) per layer. Each
//! request is classified as a [`ProbeOutcome`]; nothing a single layer does
//! stops the run.

pub mod capabilities;
pub mod error;
pub mod outcome;
pub mod prober;
pub mod request;

pub use capabilities::{parse_capabilities, LayerDescriptor};
pub use error::{ProbeError, ProbeResult};
pub use outcome::{LayerProbe, ProbeOutcome, ProbeTally};
pub use prober::{probe_endpoint, ProbeOptions, WmsProber, DEFAULT_TIMEOUT};
