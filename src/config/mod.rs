//! Configuration management for vclsync
//!
//! Handles loading and validating the resolved configuration the core runs
//! with. Values come from (highest first) command-line flags, environment
//! variables, an optional TOML file, and built-in defaults. Once resolved the
//! configuration is immutable and passed by reference to every component.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;

pub mod auth;
pub mod defaults;

pub use auth::Credentials;
pub use defaults::*;

/// Main CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API token and service ID
    #[serde(flatten)]
    pub auth: Credentials,

    /// Root directory walked for local VCL files
    #[serde(default = "defaults::default_directory")]
    pub directory: PathBuf,

    /// Regex a path must match to be processed
    #[serde(default = "default_match_pattern")]
    pub match_pattern: String,

    /// Regex that excludes a path from processing
    #[serde(default = "default_skip_pattern")]
    pub skip_pattern: String,

    /// API server URL
    #[serde(default = "defaults::default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::default_timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent file workers (unbounded when absent)
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Echo diff output and enable debug logs
    #[serde(default)]
    pub debug: bool,
}

fn default_match_pattern() -> String {
    DEFAULT_MATCH_PATTERN.to_string()
}

fn default_skip_pattern() -> String {
    DEFAULT_SKIP_PATTERN.to_string()
}

/// Values supplied on the command line or through the environment
///
/// `None` means "not given", so a config file value survives.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--token` / `FASTLY_API_TOKEN`
    pub token: Option<String>,
    /// `--service` / `FASTLY_SERVICE_ID`
    pub service_id: Option<String>,
    /// `--dir` / `VCL_DIRECTORY`
    pub directory: Option<PathBuf>,
    /// `--match` / `VCL_MATCH_DIRECTORY`
    pub match_pattern: Option<String>,
    /// `--skip` / `VCL_SKIP_DIRECTORY`
    pub skip_pattern: Option<String>,
    /// `--api-url`
    pub api_url: Option<String>,
    /// `--concurrency`
    pub concurrency: Option<usize>,
    /// `--debug`
    pub debug: bool,
}

impl Config {
    /// Resolve the configuration for one invocation
    ///
    /// An explicit `file` must exist; the default location is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed, or if the
    /// merged result fails [`Config::validate`].
    pub fn resolve(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_from(path)?,
            None => Self::load_default()?,
        };
        config.merge(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, or defaults if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| CliError::InvalidConfig(e.to_string()))
    }

    /// Get the path to the default config file
    ///
    /// Tries in order:
    /// 1. `XDG_CONFIG_HOME/vclsync/config.toml`
    /// 2. `~/.config/vclsync/config.toml`
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|path| path.join("vclsync").join("config.toml"))
    }

    /// Merge command-line/environment values into this config
    pub fn merge(&mut self, overrides: ConfigOverrides) {
        fn given(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        if let Some(token) = given(overrides.token) {
            self.auth.token = token;
        }
        if let Some(service_id) = given(overrides.service_id) {
            self.auth.service_id = service_id;
        }
        if let Some(directory) = overrides.directory {
            if !directory.as_os_str().is_empty() {
                self.directory = directory;
            }
        }
        if let Some(pattern) = given(overrides.match_pattern) {
            self.match_pattern = pattern;
        }
        if let Some(pattern) = given(overrides.skip_pattern) {
            self.skip_pattern = pattern;
        }
        if let Some(api_url) = given(overrides.api_url) {
            self.api_url = api_url;
        }
        if overrides.concurrency.is_some() {
            self.concurrency = overrides.concurrency;
        }
        if overrides.debug {
            self.debug = true;
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error for a missing token or service ID, an empty API URL,
    /// a zero timeout, or a concurrency cap of zero or above
    /// [`Semaphore::MAX_PERMITS`].
    pub fn validate(&self) -> Result<()> {
        if !self.auth.is_authenticated() {
            return Err(CliError::MissingToken);
        }

        if !self.auth.has_service() {
            return Err(CliError::MissingServiceId);
        }

        if self.api_url.is_empty() {
            return Err(CliError::InvalidConfig("api_url cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(CliError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.concurrency == Some(0) {
            return Err(CliError::InvalidConfig(
                "concurrency must be greater than 0".to_string(),
            ));
        }

        if self.concurrency.is_some_and(|n| n > Semaphore::MAX_PERMITS) {
            return Err(CliError::InvalidConfig(format!(
                "concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(())
    }

    /// Service ID the invocation targets
    #[must_use]
    pub fn service_id(&self) -> &str {
        &self.auth.service_id
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: Credentials::default(),
            directory: default_directory(),
            match_pattern: default_match_pattern(),
            skip_pattern: default_skip_pattern(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            concurrency: None,
            debug: false,
        }
    }
}
