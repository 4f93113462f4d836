//! Raw comparison events.

use std::fmt;

use crate::node::{Attribute, XmlElement};

/// Kind of discrepancy observed while walking two trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    /// The compared nodes are of different categories (text vs. element).
    NodeType,
    /// The root elements have different names.
    ElementName,
    /// The root element names differ only in their namespace prefix.
    NamespacePrefix,
    /// An attribute present on both elements has different values.
    AttrValue,
    /// An attribute is present on only one of the elements.
    AttrMissing,
    /// The `xsi:schemaLocation` hints differ.
    SchemaLocation,
    /// The `xsi:noNamespaceSchemaLocation` hints differ.
    NoNamespaceSchemaLocation,
    /// The normalized text content differs.
    TextValue,
    /// An element has no structurally equivalent counterpart.
    ChildLookup,
    /// The number of element children differs.
    ChildListLength,
    /// A matched child sits at a different position.
    ChildListSequence,
}

impl ComparisonKind {
    /// Returns true for kinds that only reflect order, cardinality or schema
    /// hints and never count as a difference.
    pub fn is_noise(&self) -> bool {
        matches!(
            self,
            ComparisonKind::NodeType
                | ComparisonKind::SchemaLocation
                | ComparisonKind::NoNamespaceSchemaLocation
                | ComparisonKind::ChildListLength
                | ComparisonKind::ChildListSequence
        )
    }

    /// Returns a short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ComparisonKind::NodeType => "node type",
            ComparisonKind::ElementName => "element name",
            ComparisonKind::NamespacePrefix => "namespace prefix",
            ComparisonKind::AttrValue => "attribute value",
            ComparisonKind::AttrMissing => "attribute presence",
            ComparisonKind::SchemaLocation => "schema location",
            ComparisonKind::NoNamespaceSchemaLocation => "no-namespace schema location",
            ComparisonKind::TextValue => "text value",
            ComparisonKind::ChildLookup => "child lookup",
            ComparisonKind::ChildListLength => "child list length",
            ComparisonKind::ChildListSequence => "child list sequence",
        }
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// How serious an observation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    /// Nothing differs.
    Equal,
    /// The nodes differ in a way that does not change their meaning.
    Similar,
    /// The nodes differ.
    Different,
}

/// The node an event refers to on one side of the comparison.
///
/// Targets are snapshots, so events stay meaningful without the trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An element (name and attributes).
    Element(XmlElement),
    /// An attribute together with the element that owns it.
    Attribute {
        /// The attribute itself.
        attribute: Attribute,
        /// The enclosing element.
        owner: XmlElement,
    },
    /// Normalized text content of an element.
    Text(String),
}

impl Target {
    /// Returns the element, for element targets.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Target::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the attribute and its owner, for attribute targets.
    pub fn as_attribute(&self) -> Option<(&Attribute, &XmlElement)> {
        match self {
            Target::Attribute { attribute, owner } => Some((attribute, owner)),
            _ => None,
        }
    }
}

/// One side of a comparison event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Path of the node, if it could be resolved.
    pub path: Option<String>,
    /// The node itself, if it exists on this side.
    pub target: Option<Target>,
    /// The compared value on this side (text, attribute value, count, ...).
    pub value: Option<String>,
}

impl Location {
    /// A location that could not be resolved at all.
    pub fn unresolved() -> Self {
        Location::default()
    }

    /// A location known only by path; the node does not exist on this side.
    pub fn path_only(path: impl Into<String>) -> Self {
        Location {
            path: Some(path.into()),
            ..Location::default()
        }
    }

    /// A location with a path and a target node.
    pub fn at(path: impl Into<String>, target: Target) -> Self {
        Location {
            path: Some(path.into()),
            target: Some(target),
            value: None,
        }
    }

    /// Sets the compared value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A raw observation made while comparing two positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEvent {
    /// What was compared.
    pub kind: ComparisonKind,
    /// How much it differs.
    pub outcome: Outcome,
    /// Control-side location.
    pub control: Location,
    /// Test-side location.
    pub test: Location,
}

impl ComparisonEvent {
    /// Creates an event with a [`Outcome::Different`] outcome.
    pub fn different(kind: ComparisonKind, control: Location, test: Location) -> Self {
        ComparisonEvent {
            kind,
            outcome: Outcome::Different,
            control,
            test,
        }
    }

    /// Creates an event with a [`Outcome::Similar`] outcome.
    pub fn similar(kind: ComparisonKind, control: Location, test: Location) -> Self {
        ComparisonEvent {
            kind,
            outcome: Outcome::Similar,
            control,
            test,
        }
    }
}
