//! Classification of a single probe request.

use std::fmt;

use ows_common::{parse_exception_report, ServiceException};
use serde::Serialize;

/// How one GetMap or GetFeatureInfo request went.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success,
    /// The service answered with an OGC exception report
    ServiceException {
        code: Option<String>,
        message: String,
    },
    Timeout,
    /// Transport error or a non-2xx answer without an exception report
    Failed(String),
}

impl ProbeOutcome {
    /// Classify a completed HTTP exchange.
    ///
    /// An exception report is a service exception whatever the status code.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if let Some(exception) = parse_exception_report(body) {
            return exception.into();
        }
        if (200..300).contains(&status) {
            ProbeOutcome::Success
        } else {
            ProbeOutcome::Failed(format!("HTTP {}", status))
        }
    }

    /// Classify a request that never produced a response.
    pub fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeOutcome::Timeout
        } else {
            ProbeOutcome::Failed(err.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

impl From<ServiceException> for ProbeOutcome {
    fn from(e: ServiceException) -> Self {
        ProbeOutcome::ServiceException {
            code: e.code,
            message: e.message,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success => write!(f, "ok"),
            ProbeOutcome::ServiceException {
                code: Some(code),
                message,
            } => write!(f, "service exception [{}] {}", code, message),
            ProbeOutcome::ServiceException {
                code: None,
                message,
            } => write!(f, "service exception {}", message),
            ProbeOutcome::Timeout => write!(f, "timed out"),
            ProbeOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcomes for one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerProbe {
    pub layer: String,
    pub get_map: ProbeOutcome,
    /// Only set when feature info probing is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_feature_info: Option<ProbeOutcome>,
}

impl LayerProbe {
    pub fn is_healthy(&self) -> bool {
        self.get_map.is_success()
            && self
                .get_feature_info
                .as_ref()
                .map_or(true, ProbeOutcome::is_success)
    }
}

/// Counts over a run, for the closing summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeTally {
    pub layers: usize,
    pub healthy: usize,
    pub service_exceptions: usize,
    pub timeouts: usize,
    pub failures: usize,
}

impl ProbeTally {
    pub fn record(&mut self, probe: &LayerProbe) {
        self.layers += 1;
        if probe.is_healthy() {
            self.healthy += 1;
        }
        for outcome in std::iter::once(&probe.get_map).chain(probe.get_feature_info.as_ref()) {
            match outcome {
                ProbeOutcome::Success => {}
                ProbeOutcome::ServiceException { .. } => self.service_exceptions += 1,
                ProbeOutcome::Timeout => self.timeouts += 1,
                ProbeOutcome::Failed(_) => self.failures += 1,
            }
        }
    }
}

impl<'a> FromIterator<&'a LayerProbe> for ProbeTally {
    fn from_iter<I: IntoIterator<Item = &'a LayerProbe>>(iter: I) -> Self {
        let mut tally = ProbeTally::default();
        for probe in iter {
            tally.record(probe);
        }
        tally
    }
}

impl fmt::Display for ProbeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} layers healthy, {} service exceptions, {} timeouts, {} failures",
            self.healthy, self.layers, self.service_exceptions, self.timeouts, self.failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCEPTION: &str = r#"<?xml version="1.0"?>
<ServiceExceptionReport version="1.3.0">
  <ServiceException code="LayerNotDefined">Could not find layer ws:gone</ServiceException>
</ServiceExceptionReport>"#;

    #[test]
    fn test_image_is_success() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ProbeOutcome::from_response(200, &jpeg), ProbeOutcome::Success);
    }

    #[test]
    fn test_exception_in_ok_response() {
        let outcome = ProbeOutcome::from_response(200, EXCEPTION.as_bytes());
        assert_eq!(
            outcome,
            ProbeOutcome::ServiceException {
                code: Some("LayerNotDefined".to_string()),
                message: "Could not find layer ws:gone".to_string(),
            }
        );
    }

    #[test]
    fn test_exception_in_error_response() {
        let outcome = ProbeOutcome::from_response(400, EXCEPTION.as_bytes());
        assert!(matches!(outcome, ProbeOutcome::ServiceException { .. }));
    }

    #[test]
    fn test_plain_error_status() {
        let outcome = ProbeOutcome::from_response(502, b"Bad Gateway");
        assert_eq!(outcome, ProbeOutcome::Failed("HTTP 502".to_string()));
    }

    #[test]
    fn test_tally() {
        let probes = vec![
            LayerProbe {
                layer: "a".to_string(),
                get_map: ProbeOutcome::Success,
                get_feature_info: Some(ProbeOutcome::Timeout),
            },
            LayerProbe {
                layer: "b".to_string(),
                get_map: ProbeOutcome::Success,
                get_feature_info: None,
            },
            LayerProbe {
                layer: "c".to_string(),
                get_map: ProbeOutcome::Failed("HTTP 500".to_string()),
                get_feature_info: None,
            },
        ];

        let tally: ProbeTally = probes.iter().collect();
        assert_eq!(tally.layers, 3);
        assert_eq!(tally.healthy, 1);
        assert_eq!(tally.timeouts, 1);
        assert_eq!(tally.failures, 1);
        assert_eq!(
            tally.to_string(),
            "1/3 layers healthy, 0 service exceptions, 1 timeouts, 1 failures"
        );
    }
}
