//! Cockpit tools - a registry of web UIs shown on the cockpit tools tab.
//!
//! This library provides the core functionality for the `tools-cli` binary:
//! the XML-backed [`storage::Store`], the tree codec that maps the XML
//! document to nested key-value objects, and the command implementations.

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;


/// Library-level error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error parsing XML file: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
