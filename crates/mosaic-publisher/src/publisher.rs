//! The three-step publish sequence for each tile directory.

use std::fmt;

use reqwest::Method;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::{Credentials, PublishConfig};
use crate::error::PublishResult;
use crate::naming::derive_store_name;
use crate::payload::{coverage_store_xml, default_style_xml};
use crate::rest::RestClient;

/// One REST call of the publish sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStep {
    CreateStore,
    ConfigureMosaic,
    AssignStyle,
}

impl PublishStep {
    /// Steps in the order they are issued.
    pub const ALL: [PublishStep; 3] = [
        PublishStep::CreateStore,
        PublishStep::ConfigureMosaic,
        PublishStep::AssignStyle,
    ];

    /// Status code the REST API answers on success.
    pub fn expected_status(&self) -> u16 {
        match self {
            PublishStep::CreateStore | PublishStep::ConfigureMosaic => 201,
            PublishStep::AssignStyle => 200,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            PublishStep::CreateStore => Method::POST,
            PublishStep::ConfigureMosaic | PublishStep::AssignStyle => Method::PUT,
        }
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::CreateStore => "create-store",
            PublishStep::ConfigureMosaic => "configure-mosaic",
            PublishStep::AssignStyle => "assign-style",
        };
        f.write_str(name)
    }
}

/// A fully resolved REST call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub step: PublishStep,
    /// Path segments below the REST root, not yet encoded
    pub segments: Vec<String>,
    pub query: Vec<(&'static str, String)>,
    pub body: String,
}

impl PlannedRequest {
    /// Segments joined with `/`, for display.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for PlannedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.step, self.step.method(), self.path())?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            write!(f, "{}{}={}", if i == 0 { '?' } else { '&' }, k, v)?;
        }
        Ok(())
    }
}

/// How one step went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// The server answered with an unexpected status
    Rejected { status: u16, body: String },
    /// No answer at all
    Failed(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: PublishStep,
    pub outcome: StepOutcome,
}

/// Everything that happened while publishing one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub path: String,
    pub store: String,
    pub steps: Vec<StepReport>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_success())
    }

    pub fn outcome(&self, step: PublishStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }
}

/// Publishes tile directories as ImageMosaic layers.
#[derive(Debug, Clone)]
pub struct MosaicPublisher {
    rest: RestClient,
    config: PublishConfig,
}

impl MosaicPublisher {
    pub fn new(config: PublishConfig, credentials: Credentials) -> PublishResult<Self> {
        let rest = RestClient::new(&config.rest_url, credentials)?;
        Ok(Self { rest, config })
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// The three calls that publishing `path` would issue, without sending
    /// anything.
    pub fn plan(&self, path: &str) -> PublishResult<Vec<PlannedRequest>> {
        let store = derive_store_name(path, self.config.name_marker.as_deref())?;
        let ws = self.config.workspace.as_str();
        let segments =
            |parts: &[&str]| -> Vec<String> { parts.iter().map(|p| p.to_string()).collect() };

        Ok(PublishStep::ALL
            .iter()
            .map(|&step| match step {
                PublishStep::CreateStore => PlannedRequest {
                    step,
                    segments: segments(&["workspaces", ws, "coveragestores"]),
                    query: Vec::new(),
                    body: coverage_store_xml(&store, ws, path),
                },
                PublishStep::ConfigureMosaic => PlannedRequest {
                    step,
                    segments: segments(&[
                        "workspaces",
                        ws,
                        "coveragestores",
                        store.as_str(),
                        "external.imagemosaic",
                    ]),
                    query: vec![
                        ("configure", "first".to_string()),
                        ("coverageName", store.clone()),
                    ],
                    body: path.to_string(),
                },
                PublishStep::AssignStyle => PlannedRequest {
                    step,
                    segments: segments(&["layers", format!("{}:{}", ws, store).as_str()]),
                    query: Vec::new(),
                    body: default_style_xml(&self.config.style),
                },
            })
            .collect())
    }

    /// Issue all three calls for `path`.
    ///
    /// Every step is attempted whatever happened to the previous one; the
    /// only error is a path no store name can be derived from.
    #[instrument(skip(self), fields(workspace = %self.config.workspace))]
    pub async fn publish_path(&self, path: &str) -> PublishResult<PublishReport> {
        let requests = self.plan(path)?;
        let store = derive_store_name(path, self.config.name_marker.as_deref())?;

        let mut steps = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = self.execute(&request).await;
            log_step(&store, request.step, &outcome);
            steps.push(StepReport {
                step: request.step,
                outcome,
            });
        }

        Ok(PublishReport {
            path: path.to_string(),
            store,
            steps,
        })
    }

    /// Publish every configured path in order.
    pub async fn publish_all(&self) -> Vec<PublishReport> {
        let mut reports = Vec::with_capacity(self.config.paths.len());
        for path in &self.config.paths {
            match self.publish_path(path).await {
                Ok(report) => reports.push(report),
                Err(e) => error!(path = %path, error = %e, "Skipping path"),
            }
        }
        reports
    }

    async fn execute(&self, request: &PlannedRequest) -> StepOutcome {
        let query: Vec<(&str, &str)> = request
            .query
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();

        match self
            .rest
            .send(request.step.method(), &request.segments, &query, request.body.clone())
            .await
        {
            Ok(response) if response.status == request.step.expected_status() => {
                StepOutcome::Succeeded
            }
            Ok(response) => StepOutcome::Rejected {
                status: response.status,
                body: response.body,
            },
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

fn log_step(store: &str, step: PublishStep, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Succeeded => info!(store = %store, step = %step, "Step succeeded"),
        StepOutcome::Rejected { status, body } => warn!(
            store = %store,
            step = %step,
            status = *status,
            body = %body,
            "Step rejected by server"
        ),
        StepOutcome::Failed(reason) => error!(
            store = %store,
            step = %step,
            reason = %reason,
            "Step failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(marker: Option<&str>) -> MosaicPublisher {
        let config = PublishConfig {
            rest_url: "http://gs/geoserver/rest".to_string(),
            workspace: "hazards".to_string(),
            style: "flood_depth".to_string(),
            name_marker: marker.map(str::to_string),
            paths: Vec::new(),
        };
        MosaicPublisher::new(config, Credentials::new("u", "p")).unwrap()
    }

    #[test]
    fn test_plan_paths_and_bodies() {
        let plan = publisher(Some("cp_cfhp"))
            .plan("/data/cp_cfhp/2024/rp100")
            .unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].path(), "workspaces/hazards/coveragestores");
        assert!(plan[0].body.contains("<name>2024_rp100</name>"));
        assert_eq!(
            plan[1].path(),
            "workspaces/hazards/coveragestores/2024_rp100/external.imagemosaic"
        );
        assert_eq!(
            plan[1].query,
            vec![
                ("configure", "first".to_string()),
                ("coverageName", "2024_rp100".to_string())
            ]
        );
        assert_eq!(plan[1].body, "/data/cp_cfhp/2024/rp100");
        assert_eq!(plan[2].path(), "layers/hazards:2024_rp100");
    }

    #[test]
    fn test_planned_request_display() {
        let plan = publisher(None).plan("/data/rp100").unwrap();
        assert_eq!(
            plan[1].to_string(),
            "configure-mosaic PUT workspaces/hazards/coveragestores/rp100/external.imagemosaic?configure=first&coverageName=rp100"
        );
    }

    #[test]
    fn test_expected_status() {
        assert_eq!(PublishStep::CreateStore.expected_status(), 201);
        assert_eq!(PublishStep::ConfigureMosaic.expected_status(), 201);
        assert_eq!(PublishStep::AssignStyle.expected_status(), 200);
    }
}
