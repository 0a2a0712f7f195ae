//! Drives a transect request against a WCS coverage.

use ows_common::GridReference;
use tracing::{error, info, instrument};

use crate::error::TransectError;
use crate::plan::{TransectPlan, TransectRequest};
use crate::profile::Profile;
use crate::raster::Raster;
use crate::wcs::WcsClient;

/// Outcome of a transect request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransectResult {
    /// Values along the line
    Profile(Profile),
    /// The whole downloaded window, rows as delivered (top row first)
    Window(Raster),
    /// The service answered but the raster could not be read
    Empty,
}

impl TransectResult {
    pub fn is_empty(&self) -> bool {
        match self {
            TransectResult::Profile(p) => p.is_empty(),
            TransectResult::Window(_) => false,
            TransectResult::Empty => true,
        }
    }

    /// JSON text for this result: distance/value pairs for a profile (or
    /// x/y/value triples with `world`), nested rows for a window, `[]` when
    /// empty.
    pub fn to_json(&self, world: bool) -> Result<String, TransectError> {
        let json = match self {
            TransectResult::Profile(p) if world => p.world_json()?,
            TransectResult::Profile(p) => p.distance_json()?,
            TransectResult::Window(r) => serde_json::to_string(&r.to_rows())?,
            TransectResult::Empty => "[]".to_string(),
        };
        Ok(json)
    }
}

/// Samples transects from one coverage of one WCS endpoint.
#[derive(Debug, Clone)]
pub struct TransectSampler {
    wcs: WcsClient,
    coverage: String,
}

impl TransectSampler {
    pub fn new(wcs: WcsClient, coverage: impl Into<String>) -> Self {
        Self {
            wcs,
            coverage: coverage.into(),
        }
    }

    /// Describe the coverage, then sample the request against it.
    pub async fn run(&self, request: &TransectRequest) -> Result<TransectResult, TransectError> {
        let grid = self.wcs.describe_coverage(&self.coverage).await?;
        self.run_on_grid(&grid, request).await
    }

    /// Sample against an already described grid.
    #[instrument(skip_all, fields(coverage = %self.coverage))]
    pub async fn run_on_grid(
        &self,
        grid: &GridReference,
        request: &TransectRequest,
    ) -> Result<TransectResult, TransectError> {
        let plan = TransectPlan::new(grid, request)?;
        let download = self.wcs.get_coverage(&self.coverage, grid, &plan).await?;

        // The download is dropped, and its file removed, on every return below.
        let raster = match download.open_raster() {
            Ok(raster) => raster,
            Err(e) => {
                error!(
                    error = %e,
                    bytes = download.len(),
                    "Raster probably empty, check what you intersect"
                );
                return Ok(TransectResult::Empty);
            }
        };

        let result = sample_raster(&plan, raster, request.all_box);
        if let TransectResult::Profile(profile) = &result {
            info!(samples = profile.len(), "Sampled transect");
        }
        Ok(result)
    }
}

/// Sample a downloaded window according to `plan`.
///
/// Unless `all_box` is set the raster is flipped so row 0 is the bottom row,
/// matching the plan's window-relative coordinates.
pub fn sample_raster(plan: &TransectPlan, raster: Raster, all_box: bool) -> TransectResult {
    if all_box {
        return TransectResult::Window(raster);
    }

    let raster = raster.flipped_vertically();
    let values = plan
        .points
        .iter()
        .map(|&(x, y)| raster.mask(raster.sample_nearest(x, y)))
        .collect();

    TransectResult::Profile(Profile::from_plan(plan, values))
}
