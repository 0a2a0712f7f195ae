//! `probe` subcommand.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info};
use wms_probe::{probe_endpoint, ProbeOptions, ProbeTally};

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// WMS endpoint, e.g. https://example.org/geoserver/ows (repeatable)
    #[arg(long = "url")]
    pub urls: Vec<String>,

    /// YAML file holding a list of endpoints
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "180")]
    pub timeout_secs: u64,

    /// Also issue GetFeatureInfo for every layer
    #[arg(long)]
    pub feature_info: bool,

    /// Announce every layer before testing it
    #[arg(long)]
    pub print_layers: bool,

    /// Only probe layers whose name contains this string
    #[arg(long)]
    pub filter: Option<String>,
}

pub async fn run(args: ProbeArgs) -> Result<()> {
    let mut urls = args.urls.clone();
    if let Some(path) = &args.urls_file {
        urls.extend(load_urls(path)?);
    }
    if urls.is_empty() {
        bail!("no WMS endpoints given, use --url or --urls-file");
    }

    let options = ProbeOptions {
        feature_info: args.feature_info,
        print_layers: args.print_layers,
        filter: args.filter.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    };

    let mut tally = ProbeTally::default();
    let mut unreachable = 0;
    for url in &urls {
        match probe_endpoint(url, options.clone()).await {
            Ok(probes) => probes.iter().for_each(|p| tally.record(p)),
            Err(e) => {
                error!(url = %url, error = %e, "Skipping endpoint");
                unreachable += 1;
            }
        }
    }

    info!(endpoints = urls.len(), unreachable, "Probing finished");
    println!("{}", tally);
    Ok(())
}

fn load_urls(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse URL list: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.yaml");
        std::fs::write(
            &path,
            "- https://a.example/geoserver/ows\n- https://b.example/geoserver/ows\n",
        )
        .unwrap();

        let urls = load_urls(&path).unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "https://b.example/geoserver/ows");
    }

    #[test]
    fn test_load_urls_rejects_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.yaml");
        std::fs::write(&path, "url: https://a.example\n").unwrap();
        assert!(load_urls(&path).is_err());
    }
}
