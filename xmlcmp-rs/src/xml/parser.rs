//! XML parser that builds node trees.
//!
//! This parser uses quick-xml's streaming API to build a [`Tree`] for the
//! root element of a document. Text is kept raw; whitespace only matters at
//! comparison time.

use std::collections::HashMap;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::loader::Document;
use crate::node::{
    is_xml_whitespace, Attribute, NodeId, Tree, XmlContent, XmlElement, XmlText,
};

/// XML parser that builds node trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlParser;

/// Parse state for a single document.
struct TreeBuilder<'d> {
    path: &'d str,
    content: &'d str,
    tree: Option<Tree>,
    stack: Vec<NodeId>,
    root_closed: bool,
}

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser
    }

    /// Parses a loaded document.
    pub fn parse(&self, document: &Document) -> Result<Tree> {
        let tree = self.parse_content(document.path(), document.content())?;
        debug!(
            path = document.path(),
            nodes = tree.len(),
            elements = tree.element_count(),
            "document parsed"
        );
        Ok(tree)
    }

    /// Parses XML from a string. `path` only labels errors.
    pub fn parse_content(&self, path: &str, xml: &str) -> Result<Tree> {
        let mut reader = Reader::from_str(xml);
        // Don't trim text - whitespace is normalized during comparison
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        let mut builder = TreeBuilder {
            path,
            content: xml,
            tree: None,
            stack: Vec::new(),
            root_closed: false,
        };

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    let position = reader.error_position();
                    return Err(builder.malformed(position, e.to_string()));
                }
            };
            let position = reader.buffer_position();

            match event {
                Event::Start(ref e) => {
                    let element = parse_element(e, &reader)
                        .map_err(|msg| builder.malformed(position, msg))?;
                    builder.open(element, position)?;
                }
                Event::Empty(ref e) => {
                    let element = parse_element(e, &reader)
                        .map_err(|msg| builder.malformed(position, msg))?;
                    builder.open(element, position)?;
                    builder.close();
                }
                Event::End(_) => builder.close(),
                Event::Text(e) => {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| builder.malformed(position, e.to_string()))?;
                    let text = unescape(raw).map_err(|e| builder.malformed(position, e.to_string()))?;
                    builder.text(&text, position)?;
                }
                Event::CData(e) => {
                    // Treat CDATA like text
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    builder.text(&text, position)?;
                }
                Event::GeneralRef(e) => {
                    let name = reader
                        .decoder()
                        .decode(e.as_ref())
                        .map_err(|e| builder.malformed(position, e.to_string()))?;
                    let reference = format!("&{};", name);
                    let text = unescape(&reference)
                        .map_err(|e| builder.malformed(position, e.to_string()))?;
                    builder.text(&text, position)?;
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                    // Not part of the comparable tree
                }
            }
        }

        let end = reader.buffer_position();
        builder.finish(end)
    }
}

impl TreeBuilder<'_> {
    fn open(&mut self, element: XmlElement, position: u64) -> Result<()> {
        if let (Some(parent), Some(tree)) = (self.stack.last().copied(), self.tree.as_mut()) {
            let id = tree.add_child(parent, XmlContent::Element(element));
            self.stack.push(id);
            return Ok(());
        }
        if self.root_closed {
            return Err(self.malformed(
                position,
                format!("second root element <{}>", element.qname()),
            ));
        }

        let tree = Tree::new(element);
        self.stack.push(tree.root());
        self.tree = Some(tree);
        Ok(())
    }

    fn close(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.root_closed = true;
        }
    }

    fn text(&mut self, text: &str, position: u64) -> Result<()> {
        if let (Some(parent), Some(tree)) = (self.stack.last().copied(), self.tree.as_mut()) {
            tree.add_child(parent, XmlContent::Text(XmlText::new(text)));
            return Ok(());
        }
        if text.chars().all(is_xml_whitespace) {
            Ok(())
        } else {
            Err(self.malformed(position, "text outside of the root element".to_string()))
        }
    }

    fn finish(self, position: u64) -> Result<Tree> {
        if let Some(&open) = self.stack.last() {
            let name = self
                .tree
                .as_ref()
                .and_then(|t| t.element(open))
                .map(|e| e.qname().to_string())
                .unwrap_or_default();
            return Err(self.malformed(position, format!("unclosed element <{}>", name)));
        }
        match self.tree {
            Some(tree) => Ok(tree),
            None => Err(self.malformed(position, "no root element".to_string())),
        }
    }

    /// Builds a `MalformedXml` error for a byte offset into the content.
    fn malformed(&self, position: u64, message: String) -> Error {
        let (line, column) = line_and_column(self.content, position);
        Error::MalformedXml {
            path: self.path.to_string(),
            line,
            column,
            message,
        }
    }
}

/// Converts a byte offset into a 1-based line and character column.
fn line_and_column(content: &str, position: u64) -> (usize, usize) {
    let bytes = content.as_bytes();
    let end = usize::try_from(position).map_or(bytes.len(), |p| p.min(bytes.len()));
    let prefix = &bytes[..end];

    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |p| p + 1);
    let tail = &prefix[line_start..];
    let column = std::str::from_utf8(tail)
        .map(|s| s.chars().count())
        .unwrap_or(tail.len())
        + 1;

    (line, column)
}

/// Parses an element's name, attributes and namespace declarations.
fn parse_element(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> std::result::Result<XmlElement, String> {
    let name = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();

    let mut attributes = Vec::new();
    let mut namespace_decls = HashMap::new();
    for attr_result in e.attributes() {
        // Duplicate attribute names are rejected here
        let attr = attr_result.map_err(|e| format!("Attribute error: {}", e))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.to_string();

        if key == "xmlns" {
            namespace_decls.insert(String::new(), value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespace_decls.insert(prefix.to_string(), value);
        } else {
            attributes.push(Attribute::new(key, value));
        }
    }

    Ok(XmlElement::new_with_namespace(name, namespace_decls, attributes))
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<Tree> {
    XmlParser::new().parse_content("<string>", xml)
}
