//! Thin client for the map server's REST management API.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::config::Credentials;
use crate::error::{PublishError, PublishResult};

/// Status and body of a REST call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

/// REST client with HTTP Basic auth. Every request is sent as `text/xml`.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl RestClient {
    pub fn new(base_url: &str, credentials: Credentials) -> PublishResult<Self> {
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PublishError::InvalidConfig(format!("rest_url '{}': {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(PublishError::InvalidConfig(format!(
                "rest_url '{}' cannot hold a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL below the REST root. Each segment is percent-encoded,
    /// so names holding `/`, `?`, `#` or `%` stay one segment.
    pub fn url<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn send<S: AsRef<str>>(
        &self,
        method: Method,
        segments: &[S],
        query: &[(&str, &str)],
        body: String,
    ) -> Result<RestResponse, reqwest::Error> {
        let url = self.url(segments);
        debug!(method = %method, url = %url, "REST request");

        let response = self
            .client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "text/xml")
            .query(query)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RestResponse { status, body })
    }
}
