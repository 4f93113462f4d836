//! The comparison entry point.
//!
//! [`XmlComparer`] runs the whole pipeline: load both documents, build
//! their trees, match elements, walk the matched trees and fold the
//! surviving differences into a [`ComparisonResult`].

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::compare::compare;
use crate::error::Result;
use crate::loader::{Document, ResourceLoader};
use crate::matching::{ByName, ByNameAndAllAttributes, ElementSelector, TreeMatching};
use crate::node::Tree;
use crate::report::ComparisonResult;
use crate::xml::XmlParser;

/// Which elements may be paired with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingPolicy {
    /// Same name and exactly the same attributes.
    #[default]
    Strict,
    /// Same name only; attribute changes are reported per attribute.
    ByName,
}

impl MatchingPolicy {
    fn selector(self) -> &'static dyn ElementSelector {
        match self {
            MatchingPolicy::Strict => &ByNameAndAllAttributes,
            MatchingPolicy::ByName => &ByName,
        }
    }
}

/// Options controlling a comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Directory logical resource paths are resolved against.
    pub resource_root: PathBuf,
    /// Element pairing policy.
    pub matching: MatchingPolicy,
    /// Whether same-name leftovers are paired as near matches.
    pub near_matches: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            resource_root: PathBuf::from("."),
            matching: MatchingPolicy::Strict,
            near_matches: true,
        }
    }
}

impl CompareOptions {
    /// Sets the resource root.
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Sets the matching policy.
    pub fn with_matching(mut self, matching: MatchingPolicy) -> Self {
        self.matching = matching;
        self
    }

    /// Enables or disables near matches.
    pub fn with_near_matches(mut self, near_matches: bool) -> Self {
        self.near_matches = near_matches;
        self
    }
}

/// Compares XML documents ignoring element order and incidental whitespace.
///
/// # Example
///
/// ```
/// use xmlcmp::XmlComparer;
///
/// let comparer = XmlComparer::new();
/// let result = comparer
///     .compare_str("<root><a/><b/></root>", "<root><b/><a/></root>")
///     .unwrap();
/// assert!(result.is_equivalent());
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlComparer {
    options: CompareOptions,
    loader: ResourceLoader,
    parser: XmlParser,
}

impl XmlComparer {
    /// Creates a comparer with default options.
    pub fn new() -> Self {
        Self::with_options(CompareOptions::default())
    }

    /// Creates a comparer with the given options.
    pub fn with_options(options: CompareOptions) -> Self {
        XmlComparer {
            loader: ResourceLoader::new(options.resource_root.clone()),
            parser: XmlParser::new(),
            options,
        }
    }

    /// Returns the options in use.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Returns the loader resolving logical paths.
    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Loads two resources and compares them.
    #[instrument(skip(self), fields(root = %self.loader.root().display()))]
    pub fn compare_resources(&self, control: &str, test: &str) -> Result<ComparisonResult> {
        let control = self.loader.load(control)?;
        let test = self.loader.load(test)?;
        self.compare_documents(&control, &test)
    }

    /// Compares two loaded documents.
    #[instrument(skip_all, fields(control = control.path(), test = test.path()))]
    pub fn compare_documents(&self, control: &Document, test: &Document) -> Result<ComparisonResult> {
        let control_tree = self.parser.parse(control)?;
        let test_tree = self.parser.parse(test)?;
        let result = self.compare_trees(&control_tree, &test_tree);

        info!(
            differences = result.len(),
            equivalent = result.is_equivalent(),
            "comparison finished"
        );
        Ok(result)
    }

    /// Compares two documents given as strings.
    pub fn compare_str(&self, control: &str, test: &str) -> Result<ComparisonResult> {
        self.compare_documents(
            &Document::new("<control>", control),
            &Document::new("<test>", test),
        )
    }

    /// Compares two already parsed trees.
    pub fn compare_trees(&self, control: &Tree, test: &Tree) -> ComparisonResult {
        let matching = TreeMatching::build_with(
            control,
            test,
            self.options.matching.selector(),
            self.options.near_matches,
        );
        let events = compare(control, test, &matching);
        ComparisonResult::from_events(&events)
    }
}

/// Compares two documents given as strings with default options.
pub fn compare_str(control: &str, test: &str) -> Result<ComparisonResult> {
    XmlComparer::new().compare_str(control, test)
}

/// Asserts that two XML strings are equivalent, ignoring element order.
///
/// Panics with the rendered difference report otherwise, or with the parse
/// error if either document is not well-formed.
///
/// ```
/// xmlcmp::assert_xml_equivalent!("<r><a/><b/></r>", "<r><b/><a/></r>");
/// ```
#[macro_export]
macro_rules! assert_xml_equivalent {
    ($control:expr, $test:expr $(,)?) => {
        match $crate::compare_str(&$control, &$test) {
            Ok(result) => {
                if !result.is_equivalent() {
                    panic!("XML documents are not equivalent:\n{}", result.report());
                }
            }
            Err(err) => panic!("XML comparison failed: {}", err),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DifferenceCategory;

    #[test]
    fn test_compare_str_equivalent() {
        let result = compare_str(
            "<root><a>1</a><b x=\"1\"/></root>",
            "<root>\n  <b x=\"1\"/>\n  <a> 1 </a>\n</root>",
        )
        .unwrap();
        assert!(result.is_equivalent(), "{}", result);
    }

    #[test]
    fn test_by_name_policy_reports_attribute_values() {
        let control = r#"<root><item id="1" k="a"/></root>"#;
        let test = r#"<root><item id="1" k="b"/></root>"#;

        let strict = XmlComparer::new().compare_str(control, test).unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(
            strict.differences()[0].category(),
            DifferenceCategory::StructureUnmatched
        );

        let by_name = XmlComparer::with_options(
            CompareOptions::default().with_matching(MatchingPolicy::ByName),
        )
        .compare_str(control, test)
        .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(
            by_name.differences()[0].category(),
            DifferenceCategory::AttributeValue
        );
    }

    #[test]
    fn test_without_near_matches() {
        let comparer =
            XmlComparer::with_options(CompareOptions::default().with_near_matches(false));
        let result = comparer
            .compare_str(
                r#"<root><item id="1"/></root>"#,
                r#"<root><item id="2"/></root>"#,
            )
            .unwrap();
        let categories: Vec<_> = result.iter().map(|r| r.category()).collect();
        assert_eq!(
            categories,
            vec![
                DifferenceCategory::StructureMissing,
                DifferenceCategory::StructureExtra
            ]
        );
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let err = compare_str("<root>", "<root/>").unwrap_err();
        assert!(err.is_broken_document());
        assert_eq!(err.path(), "<control>");
    }

    #[test]
    fn test_comparer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XmlComparer>();
        assert_send_sync::<Tree>();
        assert_send_sync::<ComparisonResult>();
    }

    #[test]
    fn test_assert_macro_passes() {
        crate::assert_xml_equivalent!("<r><a/><b/></r>", "<r><b/><a/></r>");
    }

    #[test]
    #[should_panic(expected = "not equivalent")]
    fn test_assert_macro_panics() {
        crate::assert_xml_equivalent!("<r><a/></r>", "<r><b/></r>");
    }
}
