//! `publish` subcommand.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use mosaic_publisher::{Credentials, MosaicPublisher, PublishConfig};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Publish configuration (YAML)
    #[arg(short, long, env = "PUBLISH_CONFIG")]
    pub config: PathBuf,

    /// REST API user
    #[arg(long, env = "GEOSERVER_USER")]
    pub username: String,

    /// REST API password
    #[arg(long, env = "GEOSERVER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Publish only these paths instead of the configured list
    #[arg(long = "path")]
    pub paths: Vec<String>,

    /// Print the planned requests without sending them
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: PublishArgs) -> Result<()> {
    let mut config = PublishConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load publish config: {}", args.config.display()))?;
    if !args.paths.is_empty() {
        config.paths = args.paths;
    }
    if config.paths.is_empty() {
        bail!("no paths to publish");
    }

    let publisher = MosaicPublisher::new(config, Credentials::new(args.username, args.password))
        .context("Failed to create REST client")?;

    if args.dry_run {
        for path in &publisher.config().paths {
            match publisher.plan(path) {
                Ok(requests) => {
                    for request in requests {
                        println!("{}", request);
                    }
                }
                Err(e) => warn!(path = %path, error = %e, "Skipping path"),
            }
        }
        return Ok(());
    }

    info!(
        rest_url = %publisher.config().rest_url,
        paths = publisher.config().paths.len(),
        "Publishing mosaics"
    );
    let reports = publisher.publish_all().await;

    let published = reports.iter().filter(|r| r.is_success()).count();
    info!(
        published,
        attempted = reports.len(),
        configured = publisher.config().paths.len(),
        "Publishing finished"
    );
    Ok(())
}
