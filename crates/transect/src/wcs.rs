//! Minimal WCS 1.0.0 client: DescribeCoverage and GetCoverage.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ows_common::{parse_exception_report, BoundingBox, GridReference};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::{Client, Response};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::TransectError;
use crate::plan::TransectPlan;
use crate::raster::{Raster, RasterError};

/// WCS protocol version spoken by this client.
pub const WCS_VERSION: &str = "1.0.0";

/// Output format requested from GetCoverage.
pub const COVERAGE_FORMAT: &str = "GeoTIFF";

/// Length of the random part of a downloaded coverage's file name.
const TEMP_NAME_LEN: usize = 7;

/// HTTP client bound to one WCS endpoint.
#[derive(Debug, Clone)]
pub struct WcsClient {
    client: Client,
    endpoint: String,
    /// Where downloads are staged; the platform temp dir when unset
    staging_dir: Option<PathBuf>,
}

impl WcsClient {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransectError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            staging_dir: None,
        }
    }

    /// Stage downloaded coverages in `dir` instead of the platform temp dir.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the grid geometry of `coverage`.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn describe_coverage(&self, coverage: &str) -> Result<GridReference, TransectError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("SERVICE", "WCS"),
                ("VERSION", WCS_VERSION),
                ("REQUEST", "DescribeCoverage"),
                ("COVERAGE", coverage),
            ])
            .send()
            .await?;

        let body = checked_body(response).await?;
        let grid = parse_describe_coverage(&body, coverage)?;

        info!(
            coverage = coverage,
            width = grid.width,
            height = grid.height,
            crs = %grid.crs,
            "Described coverage"
        );
        Ok(grid)
    }

    /// Download the planned window as GeoTIFF into a temporary file.
    #[instrument(skip(self, grid, plan), fields(endpoint = %self.endpoint))]
    pub async fn get_coverage(
        &self,
        coverage: &str,
        grid: &GridReference,
        plan: &TransectPlan,
    ) -> Result<CoverageDownload, TransectError> {
        let width = plan.window.width().to_string();
        let height = plan.window.height().to_string();
        let bbox = plan.bbox.to_kvp_string();

        debug!(bbox = %bbox, width = %width, height = %height, "Requesting coverage window");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("SERVICE", "WCS"),
                ("VERSION", WCS_VERSION),
                ("REQUEST", "GetCoverage"),
                ("COVERAGE", coverage),
                ("CRS", grid.crs.as_str()),
                ("BBOX", bbox.as_str()),
                ("WIDTH", width.as_str()),
                ("HEIGHT", height.as_str()),
                ("FORMAT", COVERAGE_FORMAT),
            ])
            .send()
            .await?;

        let body = checked_body(response).await?;
        CoverageDownload::stage(&body, self.staging_dir.as_deref()).await
    }
}

/// Read the body, turning HTTP errors and exception reports into errors.
async fn checked_body(response: Response) -> Result<Vec<u8>, TransectError> {
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    if let Some(exception) = parse_exception_report(&body) {
        return Err(TransectError::Service(exception));
    }
    if !status.is_success() {
        return Err(TransectError::HttpStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body)
}

/// A downloaded coverage staged in a temporary directory.
///
/// The file is named from 7 random alphanumerics plus `.tif` and is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct CoverageDownload {
    file: NamedTempFile,
    len: usize,
}

impl CoverageDownload {
    /// Write `bytes` to a fresh temporary file in `dir`, or in the platform
    /// temp dir when `dir` is `None`.
    pub async fn stage(bytes: &[u8], dir: Option<&Path>) -> Result<Self, TransectError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("").rand_bytes(TEMP_NAME_LEN).suffix(".tif");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        tokio::fs::write(file.path(), bytes).await?;

        debug!(path = %file.path().display(), bytes = bytes.len(), "Staged coverage download");
        Ok(Self {
            file,
            len: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the download in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode the staged file.
    pub fn open_raster(&self) -> Result<Raster, RasterError> {
        if self.is_empty() {
            return Err(RasterError::Empty);
        }
        Raster::open(self.path())
    }
}

// ============================================================================
// DescribeCoverage parsing
// ============================================================================

#[derive(Default)]
struct CoverageDescription {
    found: bool,
    srs_name: Option<String>,
    native_crs: Option<String>,
    positions: Vec<(f64, f64)>,
    low: Option<(i64, i64)>,
    high: Option<(i64, i64)>,
}

/// Parse a WCS 1.0.0 `CoverageDescription` into a grid reference.
///
/// The extent comes from `spatialDomain/Envelope`, the cell counts from the
/// inclusive `GridEnvelope` limits, and the CRS from `nativeCRSs` when
/// advertised (falling back to the envelope's `srsName`).
pub fn parse_describe_coverage(xml: &[u8], coverage: &str) -> Result<GridReference, TransectError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut desc = CoverageDescription::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                on_start(&e, &stack, &mut desc);
                stack.push(e.local_name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => on_start(&e, &stack, &mut desc),
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| TransectError::Metadata(e.to_string()))?;
                on_text(text.trim(), &stack, &mut desc)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TransectError::Metadata(format!(
                    "XML parsing error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !desc.found {
        return Err(TransectError::CoverageNotFound(coverage.to_string()));
    }

    let crs = desc
        .native_crs
        .or(desc.srs_name)
        .ok_or_else(|| TransectError::Metadata("no CRS advertised".to_string()))?;

    if desc.positions.len() < 2 {
        return Err(TransectError::Metadata(
            "spatialDomain envelope needs two gml:pos corners".to_string(),
        ));
    }
    let (lx, ly) = desc.positions[0];
    let (hx, hy) = desc.positions[1];

    let (low, high) = match (desc.low, desc.high) {
        (Some(low), Some(high)) => (low, high),
        _ => {
            return Err(TransectError::Metadata(
                "missing GridEnvelope limits".to_string(),
            ))
        }
    };
    let width = high.0 - low.0 + 1;
    let height = high.1 - low.1 + 1;
    if width <= 0 || height <= 0 {
        return Err(TransectError::Metadata(format!(
            "invalid grid limits {:?}..{:?}",
            low, high
        )));
    }

    Ok(GridReference::new(
        width as usize,
        height as usize,
        crs,
        BoundingBox::new(lx, ly, hx, hy),
    )?)
}

fn in_spatial_domain(stack: &[Vec<u8>]) -> bool {
    stack.iter().any(|n| n.as_slice() == b"spatialDomain")
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2].as_slice() == name
}

fn on_start(e: &BytesStart, stack: &[Vec<u8>], desc: &mut CoverageDescription) {
    match e.local_name().as_ref() {
        b"CoverageOffering" => desc.found = true,
        b"Envelope" | b"EnvelopeWithTimePeriod" if in_spatial_domain(stack) => {
            for attr in e.attributes().flatten() {
                if attr.key.local_name().as_ref() == b"srsName" {
                    desc.srs_name = attr.unescape_value().ok().map(|v| v.into_owned());
                }
            }
        }
        _ => {}
    }
}

fn on_text(text: &str, stack: &[Vec<u8>], desc: &mut CoverageDescription) -> Result<(), TransectError> {
    let Some(current) = stack.last() else {
        return Ok(());
    };

    match current.as_slice() {
        b"pos" if in_spatial_domain(stack)
            && (parent_is(stack, b"Envelope") || parent_is(stack, b"EnvelopeWithTimePeriod")) =>
        {
            let (x, y) = parse_pair::<f64>(text)?;
            desc.positions.push((x, y));
        }
        b"low" if parent_is(stack, b"GridEnvelope") => desc.low = Some(parse_pair(text)?),
        b"high" if parent_is(stack, b"GridEnvelope") => desc.high = Some(parse_pair(text)?),
        b"nativeCRSs" if desc.native_crs.is_none() => {
            desc.native_crs = text.split_whitespace().next().map(str::to_string);
        }
        _ => {}
    }
    Ok(())
}

fn parse_pair<T: std::str::FromStr>(text: &str) -> Result<(T, T), TransectError> {
    let mut parts = text.split_whitespace();
    let parse = |s: Option<&str>| {
        s.and_then(|v| v.parse::<T>().ok())
            .ok_or_else(|| TransectError::Metadata(format!("expected two numbers, got '{}'", text)))
    };
    let a = parse(parts.next())?;
    let b = parse(parts.next())?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIBE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CoverageDescription version="1.0.0" xmlns="http://www.opengis.net/wcs" xmlns:gml="http://www.opengis.net/gml">
  <CoverageOffering>
    <name>dune:ahn</name>
    <lonLatEnvelope srsName="urn:ogc:def:crs:OGC:1.3:CRS84">
      <gml:pos>4.1 51.9</gml:pos>
      <gml:pos>4.4 52.1</gml:pos>
    </lonLatEnvelope>
    <domainSet>
      <spatialDomain>
        <gml:Envelope srsName="EPSG:28992">
          <gml:pos>70000.0 440000.0</gml:pos>
          <gml:pos>90000.0 450000.0</gml:pos>
        </gml:Envelope>
        <gml:RectifiedGrid dimension="2">
          <gml:limits>
            <gml:GridEnvelope>
              <gml:low>0 0</gml:low>
              <gml:high>3999 1999</gml:high>
            </gml:GridEnvelope>
          </gml:limits>
        </gml:RectifiedGrid>
      </spatialDomain>
    </domainSet>
    <supportedCRSs>
      <requestResponseCRSs>EPSG:4326</requestResponseCRSs>
      <nativeCRSs>EPSG:28992</nativeCRSs>
    </supportedCRSs>
  </CoverageOffering>
</CoverageDescription>"#;

    #[test]
    fn test_parse_describe_coverage() {
        let grid = parse_describe_coverage(DESCRIBE.as_bytes(), "dune:ahn").unwrap();
        assert_eq!(grid.width, 4000);
        assert_eq!(grid.height, 2000);
        assert_eq!(grid.crs, "EPSG:28992");
        assert_eq!(grid.bbox, BoundingBox::new(70000.0, 440000.0, 90000.0, 450000.0));
        assert_eq!(grid.resolution(), (5.0, 5.0));
    }

    #[test]
    fn test_falls_back_to_envelope_srs() {
        let xml = DESCRIBE.replace("<nativeCRSs>EPSG:28992</nativeCRSs>", "");
        let grid = parse_describe_coverage(xml.as_bytes(), "dune:ahn").unwrap();
        assert_eq!(grid.crs, "EPSG:28992");
    }

    #[test]
    fn test_missing_offering() {
        let xml = r#"<CoverageDescription version="1.0.0"></CoverageDescription>"#;
        assert!(matches!(
            parse_describe_coverage(xml.as_bytes(), "x"),
            Err(TransectError::CoverageNotFound(_))
        ));
    }

    #[test]
    fn test_missing_limits() {
        let xml = DESCRIBE.replace("<gml:high>3999 1999</gml:high>", "");
        assert!(matches!(
            parse_describe_coverage(xml.as_bytes(), "dune:ahn"),
            Err(TransectError::Metadata(_))
        ));
    }

    #[tokio::test]
    async fn test_staged_download_is_removed_on_drop() {
        let download = CoverageDownload::stage(b"not a tiff", None).await.unwrap();
        let path = download.path().to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), TEMP_NAME_LEN + ".tif".len());
        assert!(name.ends_with(".tif"));
        assert!(name[..TEMP_NAME_LEN].chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(path.exists());

        assert!(download.open_raster().is_err());
        drop(download);
        assert!(!path.exists());
    }
}
