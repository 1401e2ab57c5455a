//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pipetriage.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analyzer caps.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Trace fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path (stdout when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Caps applied while analyzing artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum server-log matches kept on the result.
    #[serde(default = "default_max_server_log_errors")]
    pub max_server_log_errors: usize,

    /// Maximum entries in the top-vulnerabilities list.
    #[serde(default = "default_max_top_vulnerabilities")]
    pub max_top_vulnerabilities: usize,

    /// Characters of a non-JSON security report captured verbatim.
    #[serde(default = "default_raw_capture_chars")]
    pub raw_capture_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_server_log_errors: default_max_server_log_errors(),
            max_top_vulnerabilities: default_max_top_vulnerabilities(),
            raw_capture_chars: default_raw_capture_chars(),
        }
    }
}

fn default_max_server_log_errors() -> usize {
    10
}

fn default_max_top_vulnerabilities() -> usize {
    5
}

fn default_raw_capture_chars() -> usize {
    1000
}

/// CI job trace fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds. One request, no retry.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".pipetriage.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; optional
    /// settings only override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(timeout) = args.fetch_timeout {
            self.fetch.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
