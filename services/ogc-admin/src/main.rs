//! Administrative CLI for a GeoServer-based data infrastructure.
//!
//! - `publish`: register tile directories as ImageMosaic layers
//! - `probe`: GetMap/GetFeatureInfo health check of every WMS layer
//! - `transect`: value profile along a line from a WCS coverage

mod probe;
mod publish;
mod transect;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ogc-admin")]
#[command(about = "Administrative tools for GeoServer WMS/WCS endpoints", long_about = None)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish tile directories as ImageMosaic layers
    Publish(publish::PublishArgs),

    /// Probe every layer of one or more WMS endpoints
    Probe(probe::ProbeArgs),

    /// Sample a WCS coverage along a line
    Transect(transect::TransectArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Publish(args) => publish::run(args).await,
        Commands::Probe(args) => probe::run(args).await,
        Commands::Transect(args) => transect::run(args).await,
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
