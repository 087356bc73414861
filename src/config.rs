use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use url::Url;

use crate::auth::{Credentials, Token};
use crate::error::{BridgeError, Result};
use crate::trigger::{TriggerDefinition, TriggerSet};

/// Configuration file structure for the bridge.
///
/// Holds the tracker connection and the triggers watched for the job the
/// bridge runs for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeConfig {
    /// Tracker connection
    #[serde(default)]
    pub ontrack: TrackerConfig,

    /// Promotion triggers
    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrackerConfig {
    /// Base URL of the Ontrack instance (a trailing `/` is tolerated)
    #[serde(default = "default_ontrack_url", alias = "ontrackUrl")]
    pub ontrack_url: String,

    /// User name for basic authentication
    pub username: Option<String>,

    /// Password for basic authentication
    pub password: Option<String>,

    /// API token, takes precedence over basic authentication
    pub token: Option<Token>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ontrack_url: default_ontrack_url(),
            username: None,
            password: None,
            token: None,
        }
    }
}

fn default_ontrack_url() -> String {
    "http://localhost:8080".to_string()
}

impl TrackerConfig {
    pub fn new(ontrack_url: impl Into<String>) -> Self {
        Self {
            ontrack_url: ontrack_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<Token>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn credentials(&self) -> Credentials {
        match (&self.token, &self.username) {
            (Some(token), _) => Credentials::Token(token.clone()),
            (None, Some(username)) => Credentials::Basic {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            },
            (None, None) => Credentials::Anonymous,
        }
    }
}

const CONFIG_FILE_STEM: &str = "ontrack-bridge";

impl BridgeConfig {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./ontrack-bridge.toml
    /// 3. ./ontrack-bridge.json
    /// 4. ./ontrack-bridge.yaml
    /// 5. ./ontrack-bridge.yml
    /// 6. `<user config dir>/ontrack-bridge/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|ext| PathBuf::from(format!("{CONFIG_FILE_STEM}.{ext}")))
            .chain(dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_STEM).join("config.toml")));

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| config_error("Failed to read config file", path, e))?;

        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .map_err(|e| config_error("Failed to parse TOML config", path, e))?,
            "json" => serde_json::from_str(&contents)
                .map_err(|e| config_error("Failed to parse JSON config", path, e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| config_error("Failed to parse YAML config", path, e))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .map_err(|e| config_error("Failed to parse config file", path, e))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks the tracker URL and that no two triggers feed the same parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.ontrack.ontrack_url).map_err(|e| {
            BridgeError::Config(format!("Invalid Ontrack URL {}: {e}", self.ontrack.ontrack_url))
        })?;

        TriggerSet::new(self.triggers.clone())?;
        Ok(())
    }
}

fn config_error(what: &str, path: &Path, error: impl Display) -> BridgeError {
    BridgeError::Config(format!("{what} {}: {error}", path.display()))
}
