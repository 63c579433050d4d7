//! Configuration loading and management

use crate::core::auth::Action;
use crate::core::cat::CatRecord;
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a search does when its cursor names a cat that no longer exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleCursorPolicy {
    /// Fail with `InvalidArgument`
    #[default]
    Reject,
    /// Serve the first page instead
    Restart,
}

/// Search behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub stale_cursor: StaleCursorPolicy,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Allow any origin (browser clients served from another host)
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            permissive_cors: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,

    pub search: SearchConfig,

    /// Per-action auth policy overrides, e.g. `create_cat: admin_only`
    pub policies: BTreeMap<Action, String>,

    /// Optional YAML list of cats loaded into the in-memory store at startup
    pub seed_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_filter: "info,pawprint=debug".to_string(),
            search: SearchConfig::default(),
            policies: BTreeMap::new(),
            seed_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Read the configured seed file, if any
    pub fn load_seed(&self) -> Result<Vec<CatRecord>, ConfigError> {
        let Some(path) = &self.seed_file else {
            return Ok(Vec::new());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
