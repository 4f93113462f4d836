//! Difference records and the aggregated comparison result.

use std::fmt;

use crate::compare::ComparisonEvent;
use crate::constants::REPORT_RULE;

use super::classify;

/// Taxonomy of reported differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceCategory {
    /// An attribute exists on only one side.
    Attribute,
    /// An attribute has different values.
    AttributeValue,
    /// Text content differs.
    Value,
    /// An element of the control document is absent from the test document.
    StructureMissing,
    /// An element of the test document is absent from the control document.
    StructureExtra,
    /// An element has a same-name counterpart that differs in its attributes.
    StructureUnmatched,
    /// Any other structural difference.
    StructureOther,
}

impl DifferenceCategory {
    /// Returns a short label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            DifferenceCategory::Attribute => "attribute",
            DifferenceCategory::AttributeValue => "attribute-value",
            DifferenceCategory::Value => "value",
            DifferenceCategory::StructureMissing => "missing",
            DifferenceCategory::StructureExtra => "extra",
            DifferenceCategory::StructureUnmatched => "unmatched",
            DifferenceCategory::StructureOther => "structure",
        }
    }

    /// Returns true for differences about presence or identity of a node.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DifferenceCategory::StructureMissing
                | DifferenceCategory::StructureExtra
                | DifferenceCategory::StructureUnmatched
                | DifferenceCategory::StructureOther
        )
    }
}

impl fmt::Display for DifferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single reported difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceRecord {
    category: DifferenceCategory,
    message: String,
}

impl DifferenceRecord {
    /// Creates a record.
    pub fn new(category: DifferenceCategory, message: impl Into<String>) -> Self {
        DifferenceRecord {
            category,
            message: message.into(),
        }
    }

    /// Returns the category.
    pub fn category(&self) -> DifferenceCategory {
        self.category
    }

    /// Returns the rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DifferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The differences found between two documents, in discovery order.
///
/// An empty result means the documents are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonResult {
    differences: Vec<DifferenceRecord>,
}

impl ComparisonResult {
    /// Classifies `events` and keeps the records that survive, in order.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ComparisonEvent>) -> Self {
        ComparisonResult {
            differences: events.into_iter().filter_map(classify).collect(),
        }
    }

    /// Returns true when no difference was found.
    pub fn is_equivalent(&self) -> bool {
        self.differences.is_empty()
    }

    /// Number of differences.
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    /// Returns true when no difference was found.
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Returns the records.
    pub fn differences(&self) -> &[DifferenceRecord] {
        &self.differences
    }

    /// Iterates over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, DifferenceRecord> {
        self.differences.iter()
    }

    /// Returns the rendered messages.
    pub fn messages(&self) -> Vec<&str> {
        self.differences.iter().map(DifferenceRecord::message).collect()
    }

    /// Renders the human-readable report.
    ///
    /// Differences are framed by rule lines, one `- message` line each:
    ///
    /// ```text
    /// =======================================================
    /// Documents differ: 1 difference(s) found
    /// =======================================================
    /// - Text mismatch at /root/item: expected "x" but found "y"
    /// =======================================================
    /// ```
    pub fn report(&self) -> String {
        if self.is_equivalent() {
            return "Documents are equivalent (element order ignored).\n".to_string();
        }

        let mut out = String::new();
        out.push_str(REPORT_RULE);
        out.push('\n');
        out.push_str(&format!(
            "Documents differ: {} difference(s) found\n",
            self.len()
        ));
        out.push_str(REPORT_RULE);
        out.push('\n');
        for record in &self.differences {
            out.push_str("- ");
            out.push_str(record.message());
            out.push('\n');
        }
        out.push_str(REPORT_RULE);
        out.push('\n');
        out
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl<'a> IntoIterator for &'a ComparisonResult {
    type Item = &'a DifferenceRecord;
    type IntoIter = std::slice::Iter<'a, DifferenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ComparisonResult {
    type Item = DifferenceRecord;
    type IntoIter = std::vec::IntoIter<DifferenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.differences.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{ComparisonKind, Location, Target};

    fn text_event(path: &str, expected: &str, found: &str) -> ComparisonEvent {
        ComparisonEvent::different(
            ComparisonKind::TextValue,
            Location::at(path, Target::Text(expected.into())).with_value(expected),
            Location::at(path, Target::Text(found.into())).with_value(found),
        )
    }

    #[test]
    fn test_from_events_filters_and_keeps_order() {
        let events = vec![
            text_event("/r/a", "1", "2"),
            ComparisonEvent::different(
                ComparisonKind::ChildListLength,
                Location::path_only("/r"),
                Location::path_only("/r"),
            ),
            text_event("/r/b", "3", "4"),
        ];

        let result = ComparisonResult::from_events(&events);
        assert_eq!(result.len(), 2);
        assert!(!result.is_equivalent());
        assert!(result.messages()[0].contains("/r/a"));
        assert!(result.messages()[1].contains("/r/b"));
        assert!(result.iter().all(|r| r.category() == DifferenceCategory::Value));
    }

    #[test]
    fn test_report_rendering() {
        let result = ComparisonResult::from_events(&[text_event("/root/item", "x", "y")]);
        let expected = format!(
            "{rule}\nDocuments differ: 1 difference(s) found\n{rule}\n\
             - Text mismatch at /root/item: expected \"x\" but found \"y\"\n{rule}\n",
            rule = REPORT_RULE
        );
        assert_eq!(result.report(), expected);
        assert_eq!(result.to_string(), expected);
    }

    #[test]
    fn test_equivalent_report() {
        let result = ComparisonResult::default();
        assert!(result.is_equivalent());
        assert!(result.report().contains("equivalent"));
    }

    #[test]
    fn test_category_structural() {
        assert!(DifferenceCategory::StructureMissing.is_structural());
        assert!(!DifferenceCategory::Value.is_structural());
        assert_eq!(DifferenceCategory::StructureExtra.to_string(), "extra");
    }
}
