//! XML element trees and their mapping to nested key-value objects.
//!
//! The backing file is read into a lightweight [`Element`] tree with
//! `quick-xml`, then folded into an [`Object`]:
//! - an element with element children becomes a nested object keyed by the
//!   children's tags
//! - a childless element becomes a scalar leaf decoded from its text
//!
//! The root element's own tag is not kept. Attributes, processing
//! instructions and DOCTYPE declarations are ignored.
//!
//! # Written format
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <tools>
//! 	<!--leading comment-->
//! 	<wiki>
//! 		<icon>wiki.png</icon>
//! 		<ref>http://wiki.local</ref>
//! 	</wiki>
//! </tools>
//! ```
//!
//! Empty leaves are written as `<tag/>`. An empty nested object is written the
//! same way, so it reads back as an empty string leaf.

use crate::codec::scalar;
use crate::models::{Node, Object};
use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// XML version written in the declaration header.
pub const XML_VERSION: &str = "1.0";

/// Encoding written in the declaration header.
pub const XML_ENCODING: &str = "utf-8";

/// Indentation character used when writing.
const INDENT_CHAR: u8 = b'\t';

/// A parsed XML element: tag, child elements and accumulated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            text: Some(text.into()),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Find a direct child by tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn push_text(&mut self, text: &str) {
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Result of parsing a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub root: Element,
    /// First comment seen before any element other than the root.
    pub comment: Option<String>,
}

/// Parse raw XML text into an element tree.
///
/// # Errors
///
/// Returns [`Error::Parse`] for mismatched or unclosed tags, more than one
/// root element, non-whitespace text outside the root, undecodable entities,
/// or a document without any element.
pub fn parse(raw: &str) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut comment: Option<String> = None;
    let mut seen_child = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(Error::Parse(format!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    err
                )));
            }
        };

        match event {
            Event::Start(e) => {
                let element = Element::new(tag_name(e.name().as_ref())?);
                if stack.is_empty() && root.is_some() {
                    return Err(multiple_roots(&element.name));
                }
                seen_child |= !stack.is_empty();
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = Element::new(tag_name(e.name().as_ref())?);
                seen_child |= !stack.is_empty();
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let name = tag_name(e.name().as_ref())?;
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse(format!("unexpected closing tag </{}>", name)))?;
                if element.name != name {
                    return Err(Error::Parse(format!(
                        "closing tag </{}> does not match <{}>",
                        name, element.name
                    )));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::Parse(format!("invalid text content: {}", err)))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e))?;
            }
            Event::Comment(e) => {
                if comment.is_none() && !seen_child && root.is_none() {
                    comment = Some(String::from_utf8_lossy(&e).into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Parse(format!("unclosed tag <{}>", open.name)));
    }
    let root = root.ok_or_else(|| Error::Parse("document has no root element".to_string()))?;

    Ok(ParsedDocument { root, comment })
}

fn tag_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| Error::Parse(format!("tag name is not valid UTF-8: {}", err)))
}

fn multiple_roots(name: &str) -> Error {
    Error::Parse(format!("unexpected second root element <{}>", name))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(multiple_roots(&element.name)),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(open) => open.push_text(text),
        None if text.trim().is_empty() => {}
        None => {
            return Err(Error::Parse(format!(
                "text outside the root element: {:?}",
                text.trim()
            )));
        }
    }
    Ok(())
}

/// Fold an element's children into an object.
///
/// The element's own tag is dropped. Later duplicate tags replace earlier ones.
pub fn decode(root: &Element) -> Object {
    root.children
        .iter()
        .map(|child| (child.name.clone(), decode_node(child)))
        .collect()
}

fn decode_node(element: &Element) -> Node {
    if element.has_children() {
        Node::Object(decode(element))
    } else {
        Node::Scalar(scalar::decode(element.text.as_deref()))
    }
}

/// Build an element named `root_name` whose children mirror `tree`.
pub fn encode(tree: &Object, root_name: &str) -> Element {
    let mut root = Element::new(root_name);
    root.children = tree
        .iter()
        .map(|(key, node)| encode_node(key, node))
        .collect();
    root
}

fn encode_node(key: &str, node: &Node) -> Element {
    match node {
        Node::Object(obj) => encode(obj, key),
        Node::Scalar(value) => Element::with_text(key, scalar::encode(Some(value))),
    }
}

/// Serialize an element tree as a complete, tab-indented XML document.
///
/// `comment` is written verbatim as the first child of the root.
pub fn write_document(root: &Element, comment: Option<&str>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), INDENT_CHAR, 1);

    writer
        .write_event(Event::Decl(BytesDecl::new(
            XML_VERSION,
            Some(XML_ENCODING),
            None,
        )))
        .map_err(write_error)?;
    writer
        .write_event(Event::Start(BytesStart::new(root.name.as_str())))
        .map_err(write_error)?;
    if let Some(comment) = comment {
        writer
            .write_event(Event::Comment(BytesText::from_escaped(comment)))
            .map_err(write_error)?;
    }
    for child in &root.children {
        write_element(&mut writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(root.name.as_str())))
        .map_err(write_error)?;

    let mut out = String::from_utf8(writer.into_inner())
        .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    out.push('\n');
    Ok(out)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let name = element.name.as_str();
    let text = element.text.as_deref().unwrap_or_default();

    if !element.has_children() && text.is_empty() {
        return writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(write_error);
    }

    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_error)?;
    if element.has_children() {
        for child in &element.children {
            write_element(writer, child)?;
        }
    } else {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)
}

fn write_error(err: impl std::fmt::Display) -> Error {
    Error::Io(std::io::Error::other(format!("failed to write XML: {}", err)))
}

/// Find the leading comment of a raw document without building a tree.
///
/// Returns the first comment that appears before the root element or as the
/// root's content ahead of its first child element. Best effort: text that
/// cannot be tokenized before a comment is found yields `None`.
pub fn leading_comment(raw: &str) -> Option<String> {
    let mut reader = Reader::from_str(raw);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Comment(e)) => return Some(String::from_utf8_lossy(&e).into_owned()),
            Ok(Event::Start(_)) => {
                depth += 1;
                if depth > 1 {
                    return None;
                }
            }
            Ok(Event::Empty(_)) | Ok(Event::End(_)) | Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Whether `name` can be written as an element tag.
///
/// Accepts a letter or `_` followed by letters, digits, `-`, `_` or `.`.
/// Colons are rejected so keys never turn into namespace prefixes.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Scalar};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<tools>
	<!--Registered tools-->
	<wiki>
		<icon>wiki.png</icon>
		<ref>http://wiki.local</ref>
	</wiki>
	<count>3</count>
	<enabled>TRUE</enabled>
	<empty/>
</tools>
"#;

    fn sample_object() -> Object {
        let mut tree = Object::new();
        tree.insert(
            "wiki".to_string(),
            Node::Object(Entry::new("wiki.png", "http://wiki.local").to_object()),
        );
        tree.insert("count".to_string(), Scalar::Integer(3).into());
        tree.insert("enabled".to_string(), Scalar::Boolean(true).into());
        tree.insert("empty".to_string(), Scalar::string("").into());
        tree
    }

    // ==================== parse Tests ====================

    #[test]
    fn test_parse_builds_tree_and_comment() {
        let parsed = parse(SAMPLE).unwrap();
        assert_eq!(parsed.root.name, "tools");
        assert_eq!(parsed.root.children.len(), 4);
        assert_eq!(parsed.comment.as_deref(), Some("Registered tools"));

        let wiki = parsed.root.child("wiki").unwrap();
        assert_eq!(wiki.child("icon").unwrap().text.as_deref(), Some("wiki.png"));
    }

    #[test]
    fn test_parse_comment_before_root() {
        let raw = "<?xml version=\"1.0\"?>\n<!-- outside -->\n<tools><a>1</a></tools>";
        let parsed = parse(raw).unwrap();
        assert_eq!(parsed.comment.as_deref(), Some(" outside "));
    }

    #[test]
    fn test_parse_ignores_comment_after_first_child() {
        let raw = "<tools><a>1</a><!-- late --></tools>";
        let parsed = parse(raw).unwrap();
        assert_eq!(parsed.comment, None);
    }

    #[test]
    fn test_parse_unescapes_entities_and_cdata() {
        let raw = "<tools><a>x &amp; y</a><b><![CDATA[<raw>]]></b></tools>";
        let tree = decode(&parse(raw).unwrap().root);
        assert_eq!(tree["a"], Node::Scalar(Scalar::string("x & y")));
        assert_eq!(tree["b"], Node::Scalar(Scalar::string("<raw>")));
    }

    #[test]
    fn test_parse_rejects_unclosed_tag() {
        let err = parse("<tools><wiki><icon>x</icon></tools>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_missing_root_close() {
        let err = parse("<tools><wiki/>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_second_root() {
        let err = parse("<tools/><other/>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(matches!(parse("").unwrap_err(), Error::Parse(_)));
        assert!(matches!(
            parse("<?xml version=\"1.0\"?>\n").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_parse_rejects_text_outside_root() {
        let err = parse("garbage<tools/>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    // ==================== decode / encode Tests ====================

    #[test]
    fn test_decode_sample() {
        let tree = decode(&parse(SAMPLE).unwrap().root);
        assert_eq!(tree, sample_object());
    }

    #[test]
    fn test_decode_nested_depth() {
        let raw = "<root><a><b><c>2.5</c><d>false</d></b></a></root>";
        let tree = decode(&parse(raw).unwrap().root);
        let a = tree["a"].as_object().unwrap();
        let b = a["b"].as_object().unwrap();
        assert_eq!(b["c"], Node::Scalar(Scalar::Float(2.5)));
        assert_eq!(b["d"], Node::Scalar(Scalar::Boolean(false)));
    }

    #[test]
    fn test_decode_duplicate_tags_last_wins() {
        let raw = "<tools><a>1</a><a>2</a></tools>";
        let tree = decode(&parse(raw).unwrap().root);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["a"], Node::Scalar(Scalar::Integer(2)));
    }

    #[test]
    fn test_encode_mirrors_object() {
        let root = encode(&sample_object(), "tools");
        assert_eq!(root.name, "tools");
        let wiki = root.child("wiki").unwrap();
        assert_eq!(wiki.children.len(), 2);
        assert_eq!(
            root.child("enabled").unwrap().text.as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_object_survives_write_and_parse() {
        let mut nested = Object::new();
        nested.insert("ratio".to_string(), Scalar::Float(1.0).into());
        nested.insert("label".to_string(), Scalar::string("a < b & c").into());
        let mut tree = sample_object();
        tree.insert("settings".to_string(), Node::Object(nested));

        let raw = write_document(&encode(&tree, "tools"), None).unwrap();
        let back = decode(&parse(&raw).unwrap().root);
        assert_eq!(back, tree);
    }

    #[test]
    fn test_empty_nested_object_reads_back_as_empty_leaf() {
        let mut tree = Object::new();
        tree.insert("hollow".to_string(), Node::empty_object());
        let raw = write_document(&encode(&tree, "tools"), None).unwrap();
        let back = decode(&parse(&raw).unwrap().root);
        assert_eq!(back["hollow"], Node::Scalar(Scalar::string("")));
    }

    // ==================== write_document Tests ====================

    #[test]
    fn test_write_document_format() {
        let raw = write_document(&encode(&sample_object(), "tools"), Some("note")).unwrap();
        assert!(raw.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(raw.contains("<!--note-->"));
        assert!(raw.contains("\t<wiki>"));
        assert!(raw.contains("\t\t<icon>wiki.png</icon>"));
        assert!(raw.contains("<empty/>"));
        assert!(raw.ends_with("</tools>\n"));
    }

    #[test]
    fn test_write_document_empty_root() {
        let raw = write_document(&Element::new("tools"), Some("fresh")).unwrap();
        let parsed = parse(&raw).unwrap();
        assert!(parsed.root.children.is_empty());
        assert_eq!(parsed.comment.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_comment_kept_verbatim() {
        let comment = "Line one.\n            Line two.";
        let raw = write_document(&Element::new("tools"), Some(comment)).unwrap();
        assert_eq!(leading_comment(&raw).as_deref(), Some(comment));
    }

    // ==================== leading_comment Tests ====================

    #[test]
    fn test_leading_comment_found() {
        assert_eq!(leading_comment(SAMPLE).as_deref(), Some("Registered tools"));
    }

    #[test]
    fn test_leading_comment_absent() {
        assert_eq!(leading_comment("<tools><a>1</a><!-- late --></tools>"), None);
        assert_eq!(leading_comment("<tools/>"), None);
        assert_eq!(leading_comment(""), None);
    }

    // ==================== is_valid_name Tests ====================

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("wiki"));
        assert!(is_valid_name("my-tool_2.0"));
        assert!(is_valid_name("_hidden"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("ns:tag"));
        assert!(!is_valid_name("<tag>"));
    }
}
