//! WMS 1.3.0 capabilities parsing.
//!
//! Only what a probe needs is extracted: each named layer with its title,
//! queryable flag and the bounding box (plus the CRS that box is expressed
//! in) that the probe requests are issued against.

use ows_common::BoundingBox;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::ProbeError;

/// CRS used for `EX_GeographicBoundingBox` extents.
const GEOGRAPHIC_CRS: &str = "CRS:84";

/// A named layer as advertised by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDescriptor {
    pub name: String,
    pub title: Option<String>,
    /// The layer's own bounding box, or the nearest ancestor's
    pub bbox: Option<BoundingBox>,
    /// CRS of `bbox`
    pub crs: Option<String>,
    pub queryable: bool,
}

/// Per-`<Layer>` state while its element is open.
#[derive(Default)]
struct LayerFrame {
    slot: usize,
    name: Option<String>,
    title: Option<String>,
    queryable: bool,
    extent: Option<(BoundingBox, String)>,
    geographic: [Option<f64>; 4],
}

impl LayerFrame {
    /// The layer's own extent: a `BoundingBox` wins over the geographic one.
    fn own_extent(&self) -> Option<(BoundingBox, String)> {
        if let Some(extent) = &self.extent {
            return Some(extent.clone());
        }
        match self.geographic {
            [Some(w), Some(s), Some(e), Some(n)] => {
                Some((BoundingBox::new(w, s, e, n), GEOGRAPHIC_CRS.to_string()))
            }
            _ => None,
        }
    }
}

/// Parse a capabilities document into its named layers, in document order.
///
/// Unnamed layers (pure groups) are not listed, but their extents are still
/// inherited by descendants that declare none of their own.
pub fn parse_capabilities(xml: &[u8]) -> Result<Vec<LayerDescriptor>, ProbeError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut elements: Vec<Vec<u8>> = Vec::new();
    let mut frames: Vec<LayerFrame> = Vec::new();
    let mut slots: Vec<Option<LayerDescriptor>> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if elements.is_empty() {
                    check_root(&e)?;
                    saw_root = true;
                }
                if e.local_name().as_ref() == b"Layer" {
                    frames.push(LayerFrame {
                        slot: slots.len(),
                        queryable: is_queryable(&e),
                        ..Default::default()
                    });
                    slots.push(None);
                } else if parent_is_layer(&elements) {
                    on_layer_child(&e, &mut frames);
                }
                elements.push(e.local_name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => {
                if elements.is_empty() {
                    check_root(&e)?;
                    saw_root = true;
                }
                if parent_is_layer(&elements) {
                    on_layer_child(&e, &mut frames);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| ProbeError::Capabilities(e.to_string()))?;
                on_text(text.trim(), &elements, &mut frames);
            }
            Ok(Event::End(e)) => {
                elements.pop();
                if e.local_name().as_ref() == b"Layer" {
                    if let Some(frame) = frames.pop() {
                        let descriptor = close_layer(&frame, &frames);
                        slots[frame.slot] = descriptor;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProbeError::Capabilities(format!(
                    "XML parsing error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ProbeError::Capabilities("empty document".to_string()));
    }

    Ok(slots.into_iter().flatten().collect())
}

fn check_root(e: &BytesStart) -> Result<(), ProbeError> {
    match e.local_name().as_ref() {
        b"WMS_Capabilities" | b"WMT_MS_Capabilities" => Ok(()),
        other => Err(ProbeError::Capabilities(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn parent_is_layer(elements: &[Vec<u8>]) -> bool {
    elements.last().map(|n| n.as_slice()) == Some(b"Layer")
}

fn is_queryable(e: &BytesStart) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"queryable"
            && matches!(attr.value.as_ref(), b"1" | b"true")
    })
}

/// Handle a direct child element of the innermost open layer.
fn on_layer_child(e: &BytesStart, frames: &mut [LayerFrame]) {
    let Some(frame) = frames.last_mut() else {
        return;
    };
    if e.local_name().as_ref() != b"BoundingBox" || frame.extent.is_some() {
        return;
    }

    let mut crs = None;
    let mut corners = [None; 4];
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().ok().map(|v| v.into_owned());
        match attr.key.local_name().as_ref() {
            // SRS is the 1.1.1 spelling
            b"CRS" | b"SRS" => crs = value,
            b"minx" => corners[0] = value.and_then(|v| v.parse::<f64>().ok()),
            b"miny" => corners[1] = value.and_then(|v| v.parse::<f64>().ok()),
            b"maxx" => corners[2] = value.and_then(|v| v.parse::<f64>().ok()),
            b"maxy" => corners[3] = value.and_then(|v| v.parse::<f64>().ok()),
            _ => {}
        }
    }

    if let (Some(crs), [Some(minx), Some(miny), Some(maxx), Some(maxy)]) = (crs, corners) {
        frame.extent = Some((BoundingBox::new(minx, miny, maxx, maxy), crs));
    }
}

fn on_text(text: &str, elements: &[Vec<u8>], frames: &mut [LayerFrame]) {
    let n = elements.len();
    if n < 2 {
        return;
    }
    let Some(frame) = frames.last_mut() else {
        return;
    };

    let current = elements[n - 1].as_slice();
    let parent = elements[n - 2].as_slice();

    match (parent, current) {
        (b"Layer", b"Name") => frame.name = Some(text.to_string()),
        (b"Layer", b"Title") => frame.title = Some(text.to_string()),
        (b"EX_GeographicBoundingBox", edge) if n >= 3 && elements[n - 3] == b"Layer" => {
            let index = match edge {
                b"westBoundLongitude" => 0,
                b"southBoundLatitude" => 1,
                b"eastBoundLongitude" => 2,
                b"northBoundLatitude" => 3,
                _ => return,
            };
            frame.geographic[index] = text.parse().ok();
        }
        _ => {}
    }
}

/// Build the descriptor for a closed layer, inheriting the extent from the
/// nearest still-open ancestor when it has none.
fn close_layer(frame: &LayerFrame, ancestors: &[LayerFrame]) -> Option<LayerDescriptor> {
    let name = frame.name.clone().filter(|n| !n.is_empty())?;

    let extent = frame
        .own_extent()
        .or_else(|| ancestors.iter().rev().find_map(LayerFrame::own_extent));
    let (bbox, crs) = match extent {
        Some((bbox, crs)) => (Some(bbox), Some(crs)),
        None => (None, None),
    };

    Some(LayerDescriptor {
        name,
        title: frame.title.clone(),
        bbox,
        crs,
        queryable: frame.queryable,
    })
}
