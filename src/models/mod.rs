//! Data models for the tools registry.
//!
//! This module defines the core data structures:
//! - `Scalar` - A typed leaf value (integer, float, boolean, string)
//! - `Node` - Either a `Scalar` leaf or a nested `Object`
//! - `Object` - Mapping from unique keys to child nodes
//! - `Document` - Root object plus the file's leading comment
//! - `Entry` - A registered tool (`icon` + `ref`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from unique keys to child nodes.
///
/// Key order carries no meaning; a sorted map keeps rewrites deterministic.
pub type Object = BTreeMap<String, Node>;

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Scalar {
    /// Shorthand for a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Scalar::String(value.into())
    }

    /// Returns the string content if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the scalar kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Boolean(_) => "boolean",
            Scalar::String(_) => "string",
        }
    }
}

/// Canonical textual form of a scalar.
///
/// Floats always keep a fractional part or exponent (`1.0`, `1e300`) so the
/// text parses back as a float rather than an integer.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Boolean(true) => write!(f, "true"),
            Scalar::Boolean(false) => write!(f, "false"),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// A tree element: a scalar leaf or a nested object, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Object(Object),
}

impl Node {
    /// An object node with no members.
    pub fn empty_object() -> Self {
        Node::Object(Object::new())
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(obj) => Some(obj),
            Node::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Object(_) => None,
        }
    }

    /// True for an object node with no members.
    pub fn is_empty_object(&self) -> bool {
        matches!(self, Node::Object(obj) if obj.is_empty())
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl From<Object> for Node {
    fn from(value: Object) -> Self {
        Node::Object(value)
    }
}

/// The whole content of the backing file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Top-level members; the root element's own tag is not kept.
    pub root: Object,

    /// Comment found ahead of the first entry, kept verbatim.
    pub comment: Option<String>,
}

impl Document {
    pub fn new(root: Object, comment: Option<String>) -> Self {
        Self { root, comment }
    }
}

/// Field name of the icon inside an entry object.
pub const ICON_FIELD: &str = "icon";

/// Field name of the link inside an entry object.
pub const REF_FIELD: &str = "ref";

/// A registered tool: the icon to show and the page it links to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Icon file location or URL
    pub icon: String,

    /// Link to the web page of the tool
    #[serde(rename = "ref")]
    pub link: String,
}

impl Entry {
    pub fn new(icon: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            link: link.into(),
        }
    }

    /// Read an entry from a stored object.
    ///
    /// Missing fields read as empty strings; non-string scalars are rendered
    /// in their canonical text form.
    pub fn from_object(obj: &Object) -> Self {
        Self {
            icon: field_text(obj, ICON_FIELD),
            link: field_text(obj, REF_FIELD),
        }
    }

    /// Convert to the stored object shape.
    pub fn to_object(&self) -> Object {
        let mut obj = Object::new();
        obj.insert(ICON_FIELD.to_string(), Scalar::string(&self.icon).into());
        obj.insert(REF_FIELD.to_string(), Scalar::string(&self.link).into());
        obj
    }
}

fn field_text(obj: &Object, field: &str) -> String {
    match obj.get(field) {
        Some(Node::Scalar(s)) => s.to_string(),
        _ => String::new(),
    }
}
