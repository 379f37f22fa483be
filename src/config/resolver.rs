//! Precedence resolution for runtime settings.
//!
//! ## Store Path Precedence (highest to lowest)
//!
//! 1. `--file` CLI flag
//! 2. `COCKPIT_TOOLS_FILE` environment variable
//! 3. Built-in default (`/etc/cockpit-tools.xml`)
//!
//! ## Logging
//!
//! - `COCKPIT_TOOLS_LOG` holds a tracing filter directive (default `warn`)
//! - `COCKPIT_TOOLS_LOG_JSON` switches to JSON log lines when truthy
//!
//! Empty environment values count as unset.

use crate::codec::is_truthy;
use std::path::{Path, PathBuf};

/// Default location of the backing file.
pub const DEFAULT_STORE_PATH: &str = "/etc/cockpit-tools.xml";

/// Environment variable overriding the backing file location.
pub const STORE_FILE_ENV: &str = "COCKPIT_TOOLS_FILE";

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "COCKPIT_TOOLS_LOG";

/// Environment variable enabling JSON log output.
pub const LOG_JSON_ENV: &str = "COCKPIT_TOOLS_LOG_JSON";

/// Log filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Backing file location
    pub store_path: Resolved<PathBuf>,
    /// Tracing filter directive
    pub log_filter: Resolved<String>,
    /// Emit logs as JSON lines
    pub log_json: Resolved<bool>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            store_path: Resolved::new(PathBuf::from(DEFAULT_STORE_PATH), ValueSource::Default),
            log_filter: Resolved::new(DEFAULT_LOG_FILTER.to_string(), ValueSource::Default),
            log_json: Resolved::new(false, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Get the backing file location.
    pub fn store_path(&self) -> &Path {
        &self.store_path.value
    }

    /// Get the log filter directive.
    pub fn log_filter(&self) -> &str {
        &self.log_filter.value
    }

    /// Whether logs should be emitted as JSON.
    pub fn log_json(&self) -> bool {
        self.log_json.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Backing file override from CLI flag
    pub store_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backing file override.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(ref path) = overrides.store_path {
        result.store_path = Resolved::new(path.clone(), ValueSource::CliFlag);
    } else if let Some(path) = env_value(STORE_FILE_ENV) {
        result.store_path = Resolved::new(PathBuf::from(path), env_source(STORE_FILE_ENV));
    }

    if let Some(filter) = env_value(LOG_FILTER_ENV) {
        result.log_filter = Resolved::new(filter, env_source(LOG_FILTER_ENV));
    }

    if let Some(flag) = env_value(LOG_JSON_ENV) {
        result.log_json = Resolved::new(is_truthy(&flag), env_source(LOG_JSON_ENV));
    }

    result
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_source(name: &str) -> ValueSource {
    ValueSource::EnvVar(name.to_string())
}
