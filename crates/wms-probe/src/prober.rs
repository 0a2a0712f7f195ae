//! Probe loop over a WMS endpoint's layers.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::capabilities::{parse_capabilities, LayerDescriptor};
use crate::error::{ProbeError, ProbeResult};
use crate::outcome::{LayerProbe, ProbeOutcome};
use crate::request::{
    capabilities_params, get_feature_info_params, get_map_params, ProbeTarget,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// What to probe and how.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Also issue GetFeatureInfo for every layer
    pub feature_info: bool,
    /// Announce each layer at info level before probing it
    pub print_layers: bool,
    /// Only probe layers whose name contains this string
    pub filter: Option<String>,
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            feature_info: false,
            print_layers: false,
            filter: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A connected WMS endpoint and its advertised layers.
#[derive(Debug, Clone)]
pub struct WmsProber {
    client: Client,
    url: String,
    layers: Vec<LayerDescriptor>,
    options: ProbeOptions,
}

impl WmsProber {
    /// Fetch and parse the endpoint's capabilities.
    ///
    /// Any failure here, transport or document, is a [`ProbeError::Connect`].
    #[instrument(skip(options), fields(timeout_secs = options.timeout.as_secs()))]
    pub async fn connect(url: &str, options: ProbeOptions) -> ProbeResult<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;
        let connect_err = |reason: String| ProbeError::Connect {
            url: url.to_string(),
            reason,
        };

        let response = client
            .get(url)
            .query(&capabilities_params())
            .send()
            .await
            .map_err(|e| connect_err(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| connect_err(e.to_string()))?;

        if let ProbeOutcome::ServiceException { code, message } =
            ProbeOutcome::from_response(status.as_u16(), &body)
        {
            let code = code.unwrap_or_default();
            return Err(connect_err(format!("service exception [{}] {}", code, message)));
        }
        if !status.is_success() {
            return Err(connect_err(format!("HTTP {}", status.as_u16())));
        }

        let layers = parse_capabilities(&body).map_err(|e| connect_err(e.to_string()))?;
        info!(layers = layers.len(), "Connection successful");

        Ok(Self {
            client,
            url: url.to_string(),
            layers,
            options,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every named layer in the capabilities, filter not applied.
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Layers selected by the name filter.
    pub fn selected_layers(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.layers.iter().filter(|layer| match &self.options.filter {
            Some(filter) => layer.name.contains(filter.as_str()),
            None => true,
        })
    }

    /// Probe every selected layer in order. One layer's failure never stops
    /// the next.
    pub async fn probe_all(&self) -> Vec<LayerProbe> {
        let mut probes = Vec::new();
        for layer in self.selected_layers() {
            probes.push(self.probe_layer(layer).await);
        }
        probes
    }

    /// GetMap, and GetFeatureInfo when enabled, for one layer.
    pub async fn probe_layer(&self, layer: &LayerDescriptor) -> LayerProbe {
        if self.options.print_layers {
            info!(layer = %layer.name, "testing layer");
        } else {
            debug!(layer = %layer.name, "testing layer");
        }

        let Some(target) = ProbeTarget::for_layer(layer) else {
            let outcome = ProbeOutcome::Failed("layer advertises no bounding box".to_string());
            log_outcome(&layer.name, "GetMap", &outcome);
            return LayerProbe {
                layer: layer.name.clone(),
                get_map: outcome.clone(),
                get_feature_info: self.options.feature_info.then_some(outcome),
            };
        };

        let get_map = self.send(&get_map_params(&target)).await;
        log_outcome(&layer.name, "GetMap", &get_map);

        let get_feature_info = if self.options.feature_info {
            let outcome = self.send(&get_feature_info_params(&target)).await;
            log_outcome(&layer.name, "GetFeatureInfo", &outcome);
            Some(outcome)
        } else {
            None
        };

        LayerProbe {
            layer: layer.name.clone(),
            get_map,
            get_feature_info,
        }
    }

    async fn send(&self, params: &[(&'static str, String)]) -> ProbeOutcome {
        let response = match self.client.get(&self.url).query(params).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::from_error(&e),
        };
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => ProbeOutcome::from_response(status, &body),
            Err(e) => ProbeOutcome::from_error(&e),
        }
    }
}

/// Connect to `url` and probe its layers.
pub async fn probe_endpoint(url: &str, options: ProbeOptions) -> ProbeResult<Vec<LayerProbe>> {
    info!(url = %url, "Exploring WMS endpoint");
    let prober = WmsProber::connect(url, options).await?;
    Ok(prober.probe_all().await)
}

fn log_outcome(layer: &str, request: &str, outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Success => info!(layer = %layer, request, "ok"),
        ProbeOutcome::ServiceException { code, message } => warn!(
            layer = %layer,
            request,
            code = code.as_deref().unwrap_or(""),
            message = %message,
            "WMS server error for layer"
        ),
        ProbeOutcome::Timeout => warn!(layer = %layer, request, "WMS timed out for layer"),
        ProbeOutcome::Failed(reason) => error!(
            layer = %layer,
            request,
            reason = %reason,
            "General failure for layer"
        ),
    }
}
