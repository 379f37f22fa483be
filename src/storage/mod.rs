//! Storage layer for the tools registry.
//!
//! The registry is one XML file rewritten in full on every save. [`Store`]
//! keeps the decoded [`Document`] in memory between load and save:
//!
//! - `initialize` loads the file, creating it first when it does not exist
//! - `get`/`set`/`delete` mutate the in-memory tree only
//! - `save` rewrites the whole file, carrying forward the comment found in
//!   the file currently on disk
//! - `reload` replaces the in-memory tree with the file's current content
//!
//! There is no locking across processes; concurrent writers race and the last
//! one wins.

pub mod path;

pub use path::{Intent, PathResolver};

use crate::codec::tree::{self, Element};
use crate::models::{Document, Entry, Node, Object, Scalar};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Tag of the root element written to the backing file.
pub const ROOT_TAG: &str = "tools";

/// Comment written into a newly created backing file.
pub const DEFAULT_COMMENT: &str = "This XML file describes the tools to be displayed in cockpit.\n            Add a tool to have it displayed on the tools tab.";

/// In-memory registry backed by a single XML file.
#[derive(Debug, Clone)]
pub struct Store {
    document: Document,
    resolver: Option<PathResolver>,
}

impl Store {
    /// Open the registry at `path`, creating it when it does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`Error::PermissionDenied`] when the file is missing and cannot be
    ///   created (e.g. an unprivileged caller and a system directory).
    /// - [`Error::Parse`] when the existing file is malformed.
    /// - [`Error::Io`] on read/write failures.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let resolver = PathResolver::new(path.as_ref());

        match resolver.resolve(Intent::Read) {
            Ok(_) => {}
            Err(Error::NotFound(_)) => Self::bootstrap(&resolver)?,
            Err(e) => return Err(e),
        }

        let mut store = Self {
            document: Document::default(),
            resolver: Some(resolver),
        };
        store.load()?;
        Ok(store)
    }

    /// An empty registry with no backing file.
    ///
    /// Used for read-only listings when the file neither exists nor can be
    /// created. Saving fails with [`Error::PermissionDenied`].
    pub fn in_memory() -> Self {
        Self {
            document: Document::default(),
            resolver: None,
        }
    }

    fn bootstrap(resolver: &PathResolver) -> Result<()> {
        let path = resolver.resolve(Intent::Create)?;
        let raw = tree::write_document(&Element::new(ROOT_TAG), Some(DEFAULT_COMMENT))?;
        fs::write(&path, raw)?;
        info!(path = %path.display(), "created new tools file");
        Ok(())
    }

    /// Location of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.resolver.as_ref().map(PathResolver::path)
    }

    /// Whether `save` has a file to write to.
    pub fn is_persistent(&self) -> bool {
        self.resolver.is_some()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The leading comment of the last loaded or saved file.
    pub fn comment(&self) -> Option<&str> {
        self.document.comment.as_deref()
    }

    /// Read and decode the backing file into memory.
    ///
    /// On any failure the current in-memory state is left untouched.
    pub fn load(&mut self) -> Result<()> {
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            Error::NotFound("in-memory registry has no tools file to load".to_string())
        })?;
        let path = resolver.resolve(Intent::Read)?;
        let raw = String::from_utf8(fs::read(&path)?).map_err(|e| {
            Error::Parse(format!("{}: not valid UTF-8: {}", path.display(), e))
        })?;
        let parsed = tree::parse(&raw).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        self.document = Document::new(tree::decode(&parsed.root), parsed.comment);
        debug!(
            path = %path.display(),
            entries = self.document.root.len(),
            "loaded tools file"
        );
        Ok(())
    }

    /// Discard in-memory changes and pick up the file's current content.
    pub fn reload(&mut self) -> Result<()> {
        self.load()
    }

    /// Rewrite the whole backing file from memory.
    ///
    /// The leading comment is re-read from the file on disk right before the
    /// rewrite, so comments edited by hand since the last load survive.
    pub fn save(&mut self) -> Result<()> {
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            Error::PermissionDenied("in-memory registry has no tools file to write".to_string())
        })?;
        let path = resolver.resolve(Intent::Write)?;

        let on_disk = fs::read(&path)?;
        let comment = tree::leading_comment(&String::from_utf8_lossy(&on_disk));
        let root = tree::encode(&self.document.root, ROOT_TAG);
        let raw = tree::write_document(&root, comment.as_deref())?;
        fs::write(&path, raw)?;

        self.document.comment = comment;
        info!(
            path = %path.display(),
            entries = self.document.root.len(),
            "saved tools file"
        );
        Ok(())
    }

    /// Look up a top-level node.
    ///
    /// Surrounding whitespace is trimmed from `key`. An absent key yields an
    /// empty object; use [`Store::contains`] to tell absence apart.
    pub fn get(&self, key: &str) -> Node {
        self.document
            .root
            .get(key.trim())
            .cloned()
            .unwrap_or_else(Node::empty_object)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.document.root.contains_key(key.trim())
    }

    /// Insert or update a top-level object.
    ///
    /// For an existing object, supplied fields holding an empty string are
    /// ignored, so a stored field can be replaced but never cleared here.
    /// Anything else stored under `key` is replaced by `fields`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when `key` or a field name cannot be written as
    /// an XML tag.
    pub fn set(&mut self, key: &str, fields: Object) -> Result<()> {
        let key = key.trim();
        validate_name(key)?;
        validate_fields(&fields)?;

        match self.document.root.get_mut(key) {
            Some(Node::Object(existing)) => {
                for (field, value) in fields {
                    if !is_unset(&value) {
                        existing.insert(field, value);
                    }
                }
            }
            _ => {
                self.document
                    .root
                    .insert(key.to_string(), Node::Object(fields));
            }
        }
        Ok(())
    }

    /// Remove a top-level node and return it.
    pub fn delete(&mut self, key: &str) -> Result<Node> {
        let key = key.trim();
        self.document
            .root
            .remove(key)
            .ok_or_else(|| Error::NotFound(format!("tool '{}' doesn't exist", key)))
    }

    // ==================== Entry API ====================

    /// Every registered tool.
    ///
    /// Top-level leaves are not tools and are skipped.
    pub fn list_all(&self) -> BTreeMap<String, Entry> {
        self.document
            .root
            .iter()
            .filter_map(|(name, node)| match node {
                Node::Object(obj) => Some((name.clone(), Entry::from_object(obj))),
                Node::Scalar(_) => {
                    debug!(name = %name, "skipping top-level leaf");
                    None
                }
            })
            .collect()
    }

    pub fn entry(&self, name: &str) -> Result<Entry> {
        match self.document.root.get(name.trim()) {
            Some(Node::Object(obj)) => Ok(Entry::from_object(obj)),
            _ => Err(Error::NotFound(format!(
                "tool '{}' doesn't exist",
                name.trim()
            ))),
        }
    }

    /// Add a tool, or update the supplied non-empty fields of an existing one.
    pub fn upsert(&mut self, name: &str, icon: Option<&str>, link: Option<&str>) -> Result<()> {
        let entry = Entry::new(icon.unwrap_or_default(), link.unwrap_or_default());
        if self.contains(name) && entry.icon.is_empty() && entry.link.is_empty() {
            warn!(name = %name.trim(), "upsert without values leaves tool unchanged");
        }
        self.set(name, entry.to_object())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.delete(name).map(|_| ())
    }

    /// Write the registry to disk. Same as [`Store::save`].
    pub fn persist(&mut self) -> Result<()> {
        self.save()
    }
}

fn is_unset(node: &Node) -> bool {
    matches!(node, Node::Scalar(Scalar::String(s)) if s.is_empty())
}

fn validate_name(name: &str) -> Result<()> {
    if tree::is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "'{}' is not a valid name (use letters, digits, '-', '_' or '.', starting with a letter)",
            name
        )))
    }
}

fn validate_fields(fields: &Object) -> Result<()> {
    for (name, node) in fields {
        validate_name(name)?;
        if let Node::Object(nested) = node {
            validate_fields(nested)?;
        }
    }
    Ok(())
}
