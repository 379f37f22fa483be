//! Conversion between the backing XML document and in-memory trees.
//!
//! - [`scalar`] - text to typed scalar inference and back
//! - [`tree`] - XML element trees to nested objects and back

pub mod scalar;
pub mod tree;

pub use scalar::is_truthy;
pub use tree::{Element, ParsedDocument, leading_comment, parse, write_document};
