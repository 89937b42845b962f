//! Configuration for the abbreviated reporter.
//!
//! Loaded from YAML; every field has a default so an empty file (or no file
//! at all) yields a working reporter.

use crate::log_file::{DEFAULT_KEEP, DEFAULT_MAX_BYTES};
use crate::normalize::{DEFAULT_ENV_PREFIX_PATTERN, Normalizer};
use abbrev_proto::Verbosity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level reporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Where the durable sink writes the full event record.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Size in bytes at which the log file rolls over. 0 disables rotation.
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,

    /// Number of rolled-over log files to keep.
    #[serde(default = "default_log_keep")]
    pub log_keep: u32,

    /// Command lines render only when their verbosity is above this level.
    #[serde(default = "default_command_verbosity")]
    pub command_verbosity: Verbosity,

    /// Log messages render only when their verbosity is above this level.
    #[serde(default = "default_message_verbosity")]
    pub message_verbosity: Verbosity,

    /// Regex matching the environment shim stripped from command lines.
    #[serde(default = "default_env_prefix_pattern")]
    pub env_prefix_pattern: String,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("abbrev.log")
}

fn default_log_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_log_keep() -> u32 {
    DEFAULT_KEEP
}

fn default_command_verbosity() -> Verbosity {
    Verbosity::Debug
}

fn default_message_verbosity() -> Verbosity {
    Verbosity::Info
}

fn default_env_prefix_pattern() -> String {
    DEFAULT_ENV_PREFIX_PATTERN.to_string()
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            log_max_bytes: default_log_max_bytes(),
            log_keep: default_log_keep(),
            command_verbosity: default_command_verbosity(),
            message_verbosity: default_message_verbosity(),
            env_prefix_pattern: default_env_prefix_pattern(),
        }
    }
}

impl ReporterConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path_ref)?;
        Self::parse_yaml(&content)
    }

    /// Parses configuration from YAML text.
    pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document; treat it as all defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalizer()?;
        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogFile);
        }
        Ok(())
    }

    /// Builds the command normalizer for this configuration.
    pub fn normalizer(&self) -> Result<Normalizer, ConfigError> {
        Normalizer::new(&self.env_prefix_pattern).map_err(|source| ConfigError::Pattern {
            pattern: self.env_prefix_pattern.clone(),
            source,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid env_prefix_pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("log_file must not be empty")]
    EmptyLogFile,
}
