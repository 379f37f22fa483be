//! Command implementations for tools-cli.
//!
//! Each command works on an already opened [`Store`] and returns a value
//! implementing [`CommandResult`], so `main` decides between JSON and
//! human-readable output.

use crate::config::ResolvedConfig;
use crate::models::Entry;
use crate::storage::{Intent, PathResolver, Store};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

// ==================== list ====================

/// Every registered tool, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolList {
    pub tools: BTreeMap<String, Entry>,
}

impl CommandResult for ToolList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        for (name, entry) in &self.tools {
            out.push_str(&format!("Tool name: {}\n", name));
            out.push_str(&format!("    icon : {}\n", entry.icon));
            out.push_str(&format!("    ref  : {}\n", entry.link));
        }
        out.trim_end().to_string()
    }
}

/// List all tools.
pub fn list(store: &Store) -> ToolList {
    ToolList {
        tools: store.list_all(),
    }
}

// ==================== show ====================

/// A single tool's options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolShown {
    #[serde(skip)]
    pub name: String,
    #[serde(flatten)]
    pub entry: Entry,
}

impl CommandResult for ToolShown {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!(
            "Tool name: {}\n    icon : {}\n    ref  : {}",
            self.name, self.entry.icon, self.entry.link
        )
    }
}

/// Show one tool.
pub fn show(store: &Store, name: &str) -> Result<ToolShown> {
    Ok(ToolShown {
        name: name.trim().to_string(),
        entry: store.entry(name)?,
    })
}

// ==================== add ====================

/// Options accepted by `add`, either as JSON or as `<icon> <ref>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddOptions {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "ref")]
    pub link: Option<String>,
}

impl AddOptions {
    /// Interpret the raw option arguments.
    ///
    /// One argument is read as a JSON object; two are read as icon and ref.
    pub fn parse(options: &[String]) -> Result<Self> {
        match options {
            [json] => serde_json::from_str(json)
                .map_err(|e| Error::InvalidInput(format!("Invalid JSON format: {}", e))),
            [icon, link] => Ok(Self {
                icon: Some(icon.clone()),
                link: Some(link.clone()),
            }),
            _ => Err(Error::InvalidInput(
                "add <name> <options>: expected a JSON object or <icon> <ref>".to_string(),
            )),
        }
    }
}

/// Result of `add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolAdded {
    pub name: String,
    pub created: bool,
    #[serde(flatten)]
    pub entry: Entry,
}

impl CommandResult for ToolAdded {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let verb = if self.created { "Added" } else { "Updated" };
        format!("{} tool {}", verb, self.name)
    }
}

/// Add or edit a tool and persist the registry.
pub fn add(store: &mut Store, name: &str, options: &[String]) -> Result<ToolAdded> {
    let opts = AddOptions::parse(options)?;
    let created = store.entry(name).is_err();

    store.upsert(name, opts.icon.as_deref(), opts.link.as_deref())?;
    store.persist()?;

    let name = name.trim().to_string();
    info!(name = %name, created, "tool stored");
    Ok(ToolAdded {
        entry: store.entry(&name)?,
        name,
        created,
    })
}

// ==================== delete ====================

/// Result of `del`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDeleted {
    pub name: String,
}

impl CommandResult for ToolDeleted {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!("Deleted tool {}", self.name)
    }
}

/// Delete a tool and persist the registry.
///
/// Nothing is written when the tool does not exist.
pub fn delete(store: &mut Store, name: &str) -> Result<ToolDeleted> {
    store.remove(name)?;
    store.persist()?;

    let name = name.trim().to_string();
    info!(name = %name, "tool deleted");
    Ok(ToolDeleted { name })
}

// ==================== where ====================

/// Where the backing file is and whether it can be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreLocation {
    pub path: PathBuf,
    pub source: String,
    pub exists: bool,
    pub writable: bool,
}

impl CommandResult for StoreLocation {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let state = match (self.exists, self.writable) {
            (false, _) => "missing",
            (true, true) => "writable",
            (true, false) => "read-only",
        };
        format!(
            "Tools file: {} ({})\n    source: {}",
            self.path.display(),
            state,
            self.source
        )
    }
}

/// Describe the configured backing file without opening it.
pub fn location(config: &ResolvedConfig) -> StoreLocation {
    let resolver = PathResolver::new(config.store_path());
    StoreLocation {
        path: resolver.path().to_path_buf(),
        source: config.store_path.source.to_string(),
        exists: resolver.resolve(Intent::Read).is_ok(),
        writable: resolver.resolve(Intent::Write).is_ok(),
    }
}
