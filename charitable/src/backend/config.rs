//! # Configuration
//!
//! Application configuration is read from a YAML file (path from `--config`
//! or `CHARITABLE_CONFIG`, defaulting to `charitable.yaml`). A missing file is
//! not an error: every field has a default. A handful of environment
//! variables override the file for deployment convenience.
//!
//! The `settings` map doubles as the option store consulted by the admin
//! settings views.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid table prefix '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidTablePrefix(String),
    #[error("invalid listen address '{0}'")]
    InvalidListen(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharitableConfig {
    pub database_url: String,
    /// Prefix applied to every table name
    pub table_prefix: String,
    pub listen: SocketAddr,
    pub log_level: String,
    pub debug: bool,
    /// Slugs of the addons that should be loaded at startup
    pub active_addons: Vec<String>,
    pub settings: Settings,
}

impl Default for CharitableConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:charitable.db".to_string(),
            table_prefix: "wp_".to_string(),
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            debug: false,
            active_addons: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl CharitableConfig {
    /// Load configuration from `path` and apply env overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("CHARITABLE_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(listen) = std::env::var("CHARITABLE_LISTEN") {
            self.listen = listen
                .parse()
                .map_err(|_| ConfigError::InvalidListen(listen.clone()))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_table_prefix(&self.table_prefix) {
            return Err(ConfigError::InvalidTablePrefix(self.table_prefix.clone()));
        }
        Ok(())
    }

    /// Default tracing filter directive when `RUST_LOG` is not set
    pub fn log_filter(&self) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            self.log_level.clone()
        }
    }
}

pub fn is_valid_table_prefix(prefix: &str) -> bool {
    prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Free-form option store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Resolve a nested option by key path, e.g. `["general", "minimum_donation"]`
    pub fn get_option<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(first.as_ref())?;
        for segment in rest {
            current = current.as_object()?.get(segment.as_ref())?;
        }
        Some(current)
    }
}
