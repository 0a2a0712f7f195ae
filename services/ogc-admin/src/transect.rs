//! `transect` subcommand.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;
use transect::{TransectRequest, TransectSampler, WcsClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// [[distance, value], ...]
    Distance,
    /// [[x, y, value], ...]
    World,
}

#[derive(Args, Debug)]
pub struct TransectArgs {
    /// WCS endpoint, e.g. https://example.org/geoserver/wcs
    #[arg(long, env = "WCS_HOST")]
    pub host: String,

    /// Coverage identifier, e.g. dune:ahn
    #[arg(long)]
    pub coverage: String,

    /// Line in the coverage's CRS as WKT LINESTRING
    #[arg(long)]
    pub wkt: String,

    /// CRS the line is expressed in; must match the coverage's
    #[arg(long)]
    pub crs: Option<String>,

    /// Samples per cell along the longer window axis
    #[arg(long, default_value = "1")]
    pub sampling: usize,

    /// Return the whole downloaded window instead of a profile
    #[arg(long)]
    pub all_box: bool,

    #[arg(long, value_enum, default_value = "distance")]
    pub output: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, default_value = "180")]
    pub timeout_secs: u64,
}

pub async fn run(args: TransectArgs) -> Result<()> {
    let request = TransectRequest::from_wkt(&args.wkt, args.sampling)
        .context("Invalid transect request")?
        .with_all_box(args.all_box);

    let wcs = WcsClient::new(&args.host, Duration::from_secs(args.timeout_secs))
        .context("Failed to create WCS client")?;
    let grid = wcs
        .describe_coverage(&args.coverage)
        .await
        .with_context(|| format!("Failed to describe coverage {}", args.coverage))?;

    if let Some(crs) = &args.crs {
        if !crs.eq_ignore_ascii_case(&grid.crs) {
            bail!(
                "line CRS {} differs from coverage CRS {}; reprojection is not supported",
                crs,
                grid.crs
            );
        }
    }

    let sampler = TransectSampler::new(wcs, &args.coverage);
    let result = sampler
        .run_on_grid(&grid, &request)
        .await
        .context("Transect sampling failed")?;

    if result.is_empty() {
        info!(coverage = %args.coverage, "Transect produced no values");
    }
    println!("{}", result.to_json(args.output == OutputFormat::World)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: TransectArgs,
    }

    #[test]
    fn test_defaults() {
        let w = Wrapper::try_parse_from([
            "t",
            "--host",
            "http://gs/wcs",
            "--coverage",
            "dune:ahn",
            "--wkt",
            "LINESTRING (0 0, 10 10)",
        ])
        .unwrap();
        assert_eq!(w.args.sampling, 1);
        assert_eq!(w.args.output, OutputFormat::Distance);
        assert_eq!(w.args.timeout_secs, 180);
        assert!(!w.args.all_box);
    }

    #[test]
    fn test_world_output() {
        let w = Wrapper::try_parse_from([
            "t",
            "--host",
            "http://gs/wcs",
            "--coverage",
            "c",
            "--wkt",
            "LINESTRING (0 0, 1 1)",
            "--output",
            "world",
        ])
        .unwrap();
        assert_eq!(w.args.output, OutputFormat::World);
    }
}
