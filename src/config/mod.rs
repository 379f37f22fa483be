//! Configuration for the tools registry.
//!
//! The registry lives in one XML file, `/etc/cockpit-tools.xml` by default.
//! The location can be overridden with the `--file` flag or the
//! `COCKPIT_TOOLS_FILE` environment variable; logging is tuned with
//! `COCKPIT_TOOLS_LOG` and `COCKPIT_TOOLS_LOG_JSON`.
//!
//! ## Precedence
//!
//! CLI flag > environment variable > built-in default
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;

pub use resolver::{
    ConfigOverrides, DEFAULT_LOG_FILTER, DEFAULT_STORE_PATH, LOG_FILTER_ENV, LOG_JSON_ENV,
    Resolved, ResolvedConfig, STORE_FILE_ENV, ValueSource, resolve_config,
};
