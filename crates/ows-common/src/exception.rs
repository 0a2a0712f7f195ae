//! Detection of OGC exception reports in service responses.
//!
//! OGC services frequently answer a failed GetMap/GetCoverage with HTTP 200
//! and an XML exception document instead of the requested image. Both the
//! WMS/WCS 1.x `ServiceExceptionReport` and the OWS `ExceptionReport` forms
//! are recognised.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// The first exception carried by an exception report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceException {
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for ServiceException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Parse `body` as an exception report.
///
/// Returns `None` when the body is not XML or its root element is not an
/// exception report, so it is safe to call on image payloads.
pub fn parse_exception_report(body: &[u8]) -> Option<ServiceException> {
    let first = body.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first != b'<' {
        return None;
    }

    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut seen_root = false;
    let mut in_message = false;
    let mut found = false;
    let mut code = None;
    let mut message = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                if !seen_root {
                    match name.as_ref() {
                        b"ServiceExceptionReport" | b"ExceptionReport" => seen_root = true,
                        _ => return None,
                    }
                } else if !found {
                    match name.as_ref() {
                        b"ServiceException" | b"Exception" => {
                            found = true;
                            for attr in e.attributes().flatten() {
                                let key = attr.key.local_name();
                                if key.as_ref() == b"code" || key.as_ref() == b"exceptionCode" {
                                    code = attr.unescape_value().ok().map(|v| v.into_owned());
                                }
                            }
                            // OWS carries the text in a child element
                            in_message = name.as_ref() == b"ServiceException";
                        }
                        _ => {}
                    }
                } else if name.as_ref() == b"ExceptionText" && message.is_empty() {
                    in_message = true;
                }
            }
            Ok(Event::Text(t)) if in_message => {
                if let Ok(text) = t.unescape() {
                    message.push_str(&text);
                }
            }
            Ok(Event::CData(t)) if in_message => {
                message.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if in_message
                    && (name.as_ref() == b"ServiceException" || name.as_ref() == b"ExceptionText")
                {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                if !seen_root {
                    return None;
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return None;
    }

    Some(ServiceException {
        code,
        message: message.trim().to_string(),
    })
}
