//! XML content types for tree nodes.
//!
//! This module provides `XmlContent`, which represents the content of an XML node,
//! either an element (tag with attributes) or text content.

use md5::{Digest, Md5};
use std::collections::HashMap;
use std::fmt;

/// Represents the content of an XML node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    /// An XML element with a qualified name and attributes.
    Element(XmlElement),
    /// XML text content.
    Text(XmlText),
}

impl XmlContent {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, XmlContent::Element(_))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, XmlContent::Text(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a reference to the text, if this is a text node.
    pub fn as_text(&self) -> Option<&XmlText> {
        match self {
            XmlContent::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A single attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Qualified attribute name (e.g. `id`, `xsi:schemaLocation`).
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value.replace('"', "&quot;"))
    }
}

/// Splits a qualified name into prefix and local part.
fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

/// Digest of an attribute set that ignores declaration order.
fn attribute_set_digest(attributes: &[Attribute]) -> [u8; 16] {
    let mut sorted: Vec<&Attribute> = attributes.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut hasher = Md5::new();
    for attr in sorted {
        // Length prefixes keep `a="bc"` and `ab="c"` apart
        hasher.update((attr.name.len() as u64).to_le_bytes());
        hasher.update(attr.name.as_bytes());
        hasher.update((attr.value.len() as u64).to_le_bytes());
        hasher.update(attr.value.as_bytes());
    }
    hasher.finalize().into()
}

/// An XML element with a qualified name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// The qualified name of the element (e.g., "div", "ns:element").
    name: String,
    /// Namespace declarations on this element (prefix -> URI, "" for the default namespace).
    namespace_decls: HashMap<String, String>,
    /// Attributes in declaration order.
    attributes: Vec<Attribute>,
    /// MD5 digest of the attribute set.
    attr_hash: [u8; 16],
}

impl XmlElement {
    /// Creates a new XML element with the given name and attributes.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self::new_with_namespace(name, HashMap::new(), attributes)
    }

    /// Creates a new element with namespace declarations.
    pub fn new_with_namespace(
        name: impl Into<String>,
        namespace_decls: HashMap<String, String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        let attr_hash = attribute_set_digest(&attributes);
        XmlElement {
            name: name.into(),
            namespace_decls,
            attributes,
            attr_hash,
        }
    }

    /// Returns the qualified name of the element.
    pub fn qname(&self) -> &str {
        &self.name
    }

    /// Returns the name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Returns the attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns namespace declarations on this element.
    pub fn namespace_decls(&self) -> &HashMap<String, String> {
        &self.namespace_decls
    }

    /// Tests whether two elements have the same name and the same attribute
    /// set, ignoring attribute order.
    ///
    /// Namespace declarations do not take part in the comparison.
    pub fn content_equals(&self, other: &XmlElement) -> bool {
        self.name == other.name && self.attr_hash == other.attr_hash
    }

    /// Returns the order-independent digest of the attribute set.
    pub fn attribute_digest(&self) -> [u8; 16] {
        self.attr_hash
    }

    /// Tests whether two elements have the same qualified name.
    pub fn names_match(&self, other: &XmlElement) -> bool {
        self.name == other.name
    }
}

/// Renders the start tag with all attributes, e.g. `<item id="1" kind="a">`.
impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for attr in &self.attributes {
            write!(f, " {}", attr)?;
        }
        write!(f, ">")
    }
}

/// XML text content.
///
/// The raw text is kept as parsed; comparisons use [`XmlText::normalized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlText {
    text: String,
}

impl XmlText {
    /// Creates a new text node from a string.
    pub fn new(text: impl Into<String>) -> Self {
        XmlText { text: text.into() }
    }

    /// Returns the raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends more raw text.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Returns true if the text contains only whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(is_xml_whitespace)
    }

    /// Returns the whitespace-normalized text.
    pub fn normalized(&self) -> String {
        normalize_whitespace(&self.text)
    }
}

impl fmt::Display for XmlText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Returns true for the XML whitespace characters: space, tab, CR and LF.
///
/// Other Unicode spaces such as U+00A0 are content.
pub fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Collapses runs of XML whitespace to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_xml_whitespace(c) {
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }

    result
}
