//! XML parsing and conversion.
//!
//! This module turns document text into comparable [`Tree`]s and converts
//! trees into JSON for inspection.

mod json;
mod parser;

pub use json::{to_json, to_json_string};
pub use parser::{parse_str, XmlParser};

use crate::error::Result;
use crate::loader::Document;
use crate::node::Tree;

/// Parses a loaded document into a tree.
pub fn parse(document: &Document) -> Result<Tree> {
    XmlParser::new().parse(document)
}
