//! KVP parameters for the probe requests.

use ows_common::BoundingBox;

use crate::capabilities::LayerDescriptor;

/// WMS protocol version spoken by the prober.
pub const WMS_VERSION: &str = "1.3.0";

/// Probe image edge in pixels.
pub const PROBE_SIZE: u32 = 10;

/// Probe image format.
pub const PROBE_FORMAT: &str = "image/jpeg";

/// GetFeatureInfo response format.
pub const INFO_FORMAT: &str = "text/html";

/// Pixel queried by GetFeatureInfo, the centre of the probe image.
pub const PROBE_PIXEL: (u32, u32) = (5, 5);

/// Geometry a probe request is issued against.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTarget<'a> {
    pub layer: &'a str,
    pub crs: &'a str,
    pub bbox: BoundingBox,
}

impl<'a> ProbeTarget<'a> {
    /// `None` when the layer advertises no extent at all.
    pub fn for_layer(layer: &'a LayerDescriptor) -> Option<Self> {
        Some(Self {
            layer: &layer.name,
            crs: layer.crs.as_deref()?,
            bbox: layer.bbox?,
        })
    }
}

pub fn capabilities_params() -> Vec<(&'static str, String)> {
    vec![
        ("SERVICE", "WMS".to_string()),
        ("VERSION", WMS_VERSION.to_string()),
        ("REQUEST", "GetCapabilities".to_string()),
    ]
}

/// A 10x10 JPEG GetMap of the layer's whole extent.
pub fn get_map_params(target: &ProbeTarget) -> Vec<(&'static str, String)> {
    map_params("GetMap", target)
}

/// GetMap parameters plus a GetFeatureInfo query of the centre pixel.
pub fn get_feature_info_params(target: &ProbeTarget) -> Vec<(&'static str, String)> {
    let mut params = map_params("GetFeatureInfo", target);
    params.extend([
        ("QUERY_LAYERS", target.layer.to_string()),
        ("INFO_FORMAT", INFO_FORMAT.to_string()),
        ("I", PROBE_PIXEL.0.to_string()),
        ("J", PROBE_PIXEL.1.to_string()),
    ]);
    params
}

/// Map-view parameters shared by GetMap and GetFeatureInfo.
fn map_params(request: &str, target: &ProbeTarget) -> Vec<(&'static str, String)> {
    vec![
        ("SERVICE", "WMS".to_string()),
        ("VERSION", WMS_VERSION.to_string()),
        ("REQUEST", request.to_string()),
        ("LAYERS", target.layer.to_string()),
        ("STYLES", String::new()),
        ("CRS", target.crs.to_string()),
        ("BBOX", target.bbox.to_kvp_string()),
        ("WIDTH", PROBE_SIZE.to_string()),
        ("HEIGHT", PROBE_SIZE.to_string()),
        ("FORMAT", PROBE_FORMAT.to_string()),
    ]
}
