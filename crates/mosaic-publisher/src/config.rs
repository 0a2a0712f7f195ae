//! Publish configuration loaded from YAML.
//!
//! ```yaml
//! rest_url: http://localhost:8080/geoserver/rest
//! workspace: hazards
//! style: flood_depth
//! name_marker: cp_cfhp
//! paths:
//!   - /data/cp_cfhp/2024/rp100
//!   - /data/cp_cfhp/2024/rp1000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

/// What to publish and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
    /// REST endpoint root, e.g. `http://localhost:8080/geoserver/rest`
    pub rest_url: String,
    pub workspace: String,
    /// Default style assigned to every published layer
    pub style: String,
    /// Store names are taken from the path after the last occurrence of
    /// this marker
    #[serde(default)]
    pub name_marker: Option<String>,
    /// Tile directories, as seen by the map server
    #[serde(default)]
    pub paths: Vec<String>,
}

impl PublishConfig {
    pub fn from_file(path: impl AsRef<Path>) -> PublishResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> PublishResult<Self> {
        let config: PublishConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> PublishResult<()> {
        if self.rest_url.trim().is_empty() {
            return Err(PublishError::InvalidConfig("rest_url must be set".into()));
        }
        if self.workspace.trim().is_empty() {
            return Err(PublishError::InvalidConfig("workspace must be set".into()));
        }
        if self.style.trim().is_empty() {
            return Err(PublishError::InvalidConfig("style must be set".into()));
        }
        if matches!(&self.name_marker, Some(m) if m.is_empty()) {
            return Err(PublishError::InvalidConfig(
                "name_marker must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP Basic credentials for the REST API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
