//! xmlcmp - Unordered XML comparison
//!
//! This library decides whether two XML documents are equivalent when the
//! order of sibling elements and incidental whitespace do not matter, and
//! describes every difference when they are not.
//!
//! # Overview
//!
//! A comparison runs through a fixed pipeline:
//!
//! 1. [`ResourceLoader`] reads both documents (UTF-8)
//! 2. [`XmlParser`] builds an arena [`Tree`] for each
//! 3. [`TreeMatching`] pairs elements by name and attribute set, not position
//! 4. [`compare()`] walks the matched trees and emits raw events
//! 5. [`classify`] drops order and cardinality noise and renders messages
//!
//! [`XmlComparer`] drives all of it and returns a [`ComparisonResult`].
//!
//! # Example
//!
//! ```
//! use xmlcmp::compare_str;
//!
//! let result = compare_str(
//!     r#"<root><item id="1">x</item></root>"#,
//!     r#"<root><item id="1">y</item></root>"#,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     result.messages(),
//!     vec![r#"Text mismatch at /root/item: expected "x" but found "y""#]
//! );
//! ```

pub mod compare;
pub mod comparer;
pub mod constants;
pub mod error;
pub mod loader;
pub mod matching;
pub mod node;
pub mod report;
pub mod xml;

// Re-export commonly used types
pub use compare::{compare, ComparisonEvent, ComparisonKind, Location, Outcome, Target};
pub use comparer::{compare_str, CompareOptions, MatchingPolicy, XmlComparer};
pub use error::{Error, Result};
pub use loader::{Document, ResourceLoader};
pub use matching::{
    ByName, ByNameAndAllAttributes, ChildMatching, ElementSelector, MatchKind, MatchedPair,
    TreeMatching,
};
pub use node::{Attribute, NodeId, Tree, XmlContent, XmlElement, XmlText};
pub use report::{classify, ComparisonResult, DifferenceCategory, DifferenceRecord};
pub use xml::{parse_str, to_json, to_json_string, XmlParser};
