//! Tree matching.
//!
//! This module establishes which element of the control tree corresponds to
//! which element of the test tree. The policy deciding whether two elements
//! may correspond is an [`ElementSelector`]; the default,
//! [`ByNameAndAllAttributes`], requires the same name and the same attribute
//! set. [`TreeMatching`] applies a selector depth-first from the roots down.

mod selector;
mod tree;

pub use selector::{ByName, ByNameAndAllAttributes, ElementSelector};
pub use tree::{ChildMatching, MatchKind, MatchedPair, TreeMatching};
