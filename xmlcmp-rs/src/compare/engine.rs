//! The comparator walk.
//!
//! Starting from the paired roots, every matched pair is compared (names,
//! attributes, text) and then its children are visited in control document
//! order. Unpaired children become lookup events; the extra test children of
//! a parent are reported after its control children and their subtrees.
//!
//! The walk keeps its pending work on an explicit stack, so document depth
//! is bounded by memory rather than by the thread stack.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::event::{ComparisonEvent, ComparisonKind, Location, Target};
use crate::constants::{NO_NAMESPACE_SCHEMA_LOCATION_ATTR, SCHEMA_LOCATION_ATTR, XSI_NAMESPACE};
use crate::matching::{MatchKind, MatchedPair, TreeMatching};
use crate::node::{join_attribute_path, join_path, Attribute, NodeId, Tree, XmlElement};

/// Compares two matched trees and returns every observation in encounter
/// order.
///
/// The result includes noise events; filtering is up to the caller.
///
/// When direct text on one side faces only element content on the other,
/// the `NodeType` event is noise. The replaced text is instead carried as
/// the opposite-side value of the first lookup event below that pair, so
/// it still reaches the report.
pub fn compare(control: &Tree, test: &Tree, matching: &TreeMatching) -> Vec<ComparisonEvent> {
    let Some(root) = matching.pair(control.root()) else {
        return Vec::new();
    };
    let comparator = Comparator {
        control,
        test,
        matching,
    };

    let mut events = Vec::new();
    let mut work = vec![Work::Pair(PendingPair {
        pair: root,
        control_path: control.path(root.control),
        test_path: test.path(root.test),
    })];
    while let Some(item) = work.pop() {
        match item {
            Work::Emit(event) => events.push(*event),
            Work::Pair(pending) => comparator.compare_pair(pending, &mut events, &mut work),
        }
    }

    for event in &events {
        trace!(
            kind = %event.kind,
            outcome = ?event.outcome,
            control = event.control.path.as_deref().unwrap_or("-"),
            test = event.test.path.as_deref().unwrap_or("-"),
            "comparison event"
        );
    }
    events
}

/// A matched pair waiting to be compared, with both paths already known.
struct PendingPair {
    pair: MatchedPair,
    control_path: String,
    test_path: String,
}

enum Work {
    Pair(PendingPair),
    Emit(Box<ComparisonEvent>),
}

impl Work {
    fn emit(event: ComparisonEvent) -> Self {
        Work::Emit(Box::new(event))
    }
}

/// Text that disappeared because the other side holds elements instead.
#[derive(Default)]
struct ReplacedText {
    control: Option<String>,
    test: Option<String>,
}

struct Comparator<'a> {
    control: &'a Tree,
    test: &'a Tree,
    matching: &'a TreeMatching,
}

impl Comparator<'_> {
    /// Compares one pair, appending its own events to `events` and pushing
    /// its children onto `work`.
    fn compare_pair(
        &self,
        pending: PendingPair,
        events: &mut Vec<ComparisonEvent>,
        work: &mut Vec<Work>,
    ) {
        let PendingPair {
            pair,
            control_path,
            test_path,
        } = pending;
        let (Some(control_elem), Some(test_elem)) = (
            self.control.element(pair.control),
            self.test.element(pair.test),
        ) else {
            return;
        };
        let paths = (control_path.as_str(), test_path.as_str());

        if pair.kind == MatchKind::Root {
            events.extend(self.compare_names(pair, control_elem, test_elem, paths));
        }
        // Near matches already carry both elements in their lookup event
        if pair.kind != MatchKind::Near {
            events.extend(self.compare_attributes(pair, control_elem, test_elem, paths));
        }

        let control_steps = self.control.child_steps(pair.control);
        let test_steps = self.test.child_steps(pair.test);

        let control_text = self.control.normalized_text(pair.control);
        let test_text = self.test.normalized_text(pair.test);
        let mut replaced = ReplacedText::default();
        if let Some(event) = compare_text(
            (&control_text, !control_steps.is_empty()),
            (&test_text, !test_steps.is_empty()),
            paths,
        ) {
            if event.kind == ComparisonKind::NodeType {
                if control_text.is_empty() {
                    replaced.test = Some(test_text);
                } else {
                    replaced.control = Some(control_text);
                }
            }
            events.push(event);
        }

        let Some(children) = self.matching.children(pair.control) else {
            return;
        };

        if control_steps.len() != test_steps.len() {
            events.push(ComparisonEvent::different(
                ComparisonKind::ChildListLength,
                Location::at(control_path.as_str(), Target::Element(control_elem.clone()))
                    .with_value(control_steps.len().to_string()),
                Location::at(test_path.as_str(), Target::Element(test_elem.clone()))
                    .with_value(test_steps.len().to_string()),
            ));
        }

        let test_positions: FxHashMap<NodeId, usize> = test_steps
            .iter()
            .enumerate()
            .map(|(index, (id, _))| (*id, index))
            .collect();
        let test_child_path = |id: NodeId| match test_positions.get(&id) {
            Some(&index) => join_path(&test_path, &test_steps[index].1),
            None => self.test.path(id),
        };

        // Collected in emission order, pushed reversed
        let mut pending = Vec::new();
        for (control_index, (child, step)) in control_steps.into_iter().enumerate() {
            let child_path = join_path(&control_path, &step);

            let Some(child_pair) = self.matching.pair(child) else {
                let mut test_loc = Location::unresolved();
                if let Some(text) = replaced.test.take() {
                    test_loc = test_loc.with_value(text);
                }
                pending.push(Work::emit(ComparisonEvent::different(
                    ComparisonKind::ChildLookup,
                    element_location(self.control, child, child_path),
                    test_loc,
                )));
                continue;
            };

            let test_index = test_positions.get(&child_pair.test).copied();
            let child_test_path = test_child_path(child_pair.test);
            match child_pair.kind {
                MatchKind::Near => pending.push(Work::emit(ComparisonEvent::different(
                    ComparisonKind::ChildLookup,
                    element_location(self.control, child, child_path.clone()),
                    element_location(self.test, child_pair.test, child_test_path.clone()),
                ))),
                _ if test_index != Some(control_index) => {
                    pending.push(Work::emit(ComparisonEvent::different(
                        ComparisonKind::ChildListSequence,
                        Location::path_only(child_path.as_str())
                            .with_value(control_index.to_string()),
                        Location::path_only(child_test_path.as_str()).with_value(
                            test_index.map(|i| i.to_string()).unwrap_or_default(),
                        ),
                    )));
                }
                _ => {}
            }

            pending.push(Work::Pair(PendingPair {
                pair: child_pair,
                control_path: child_path,
                test_path: child_test_path,
            }));
        }

        for &extra in children.extra() {
            let mut control_loc = Location::unresolved();
            if let Some(text) = replaced.control.take() {
                control_loc = control_loc.with_value(text);
            }
            pending.push(Work::emit(ComparisonEvent::different(
                ComparisonKind::ChildLookup,
                control_loc,
                element_location(self.test, extra, test_child_path(extra)),
            )));
        }

        work.extend(pending.into_iter().rev());
    }

    fn compare_names(
        &self,
        pair: MatchedPair,
        control_elem: &XmlElement,
        test_elem: &XmlElement,
        (control_path, test_path): (&str, &str),
    ) -> Option<ComparisonEvent> {
        if control_elem.qname() == test_elem.qname() {
            return None;
        }

        let control_loc = Location::at(control_path, Target::Element(control_elem.clone()))
            .with_value(control_elem.qname());
        let test_loc = Location::at(test_path, Target::Element(test_elem.clone()))
            .with_value(test_elem.qname());

        let control_ns = self
            .control
            .resolve_prefix(pair.control, control_elem.prefix().unwrap_or(""));
        let test_ns = self
            .test
            .resolve_prefix(pair.test, test_elem.prefix().unwrap_or(""));

        if control_elem.local_name() == test_elem.local_name() && control_ns == test_ns {
            Some(ComparisonEvent::similar(
                ComparisonKind::NamespacePrefix,
                control_loc,
                test_loc,
            ))
        } else {
            Some(ComparisonEvent::different(
                ComparisonKind::ElementName,
                control_loc,
                test_loc,
            ))
        }
    }

    fn compare_attributes(
        &self,
        pair: MatchedPair,
        control_elem: &XmlElement,
        test_elem: &XmlElement,
        (control_path, test_path): (&str, &str),
    ) -> Vec<ComparisonEvent> {
        let mut events = Vec::new();

        for attr in control_elem.attributes() {
            let control_loc = attribute_location(control_path, control_elem, attr);
            let kind = schema_kind(self.control, pair.control, attr);

            match find_attribute(test_elem, &attr.name) {
                Some(test_attr) if test_attr.value == attr.value => {}
                Some(test_attr) => events.push(ComparisonEvent::different(
                    kind.unwrap_or(ComparisonKind::AttrValue),
                    control_loc,
                    attribute_location(test_path, test_elem, test_attr),
                )),
                None => events.push(ComparisonEvent::different(
                    kind.unwrap_or(ComparisonKind::AttrMissing),
                    control_loc,
                    Location::path_only(test_path),
                )),
            }
        }

        for attr in test_elem.attributes() {
            if find_attribute(control_elem, &attr.name).is_some() {
                continue;
            }
            let kind = schema_kind(self.test, pair.test, attr);
            events.push(ComparisonEvent::different(
                kind.unwrap_or(ComparisonKind::AttrMissing),
                Location::path_only(control_path),
                attribute_location(test_path, test_elem, attr),
            ));
        }

        events
    }
}

/// Compares normalized direct text; each side also says whether it has
/// element children.
fn compare_text(
    (control_text, control_has_elements): (&str, bool),
    (test_text, test_has_elements): (&str, bool),
    (control_path, test_path): (&str, &str),
) -> Option<ComparisonEvent> {
    if control_text == test_text {
        return None;
    }

    // Text on one side faces only element content on the other
    let element_vs_text = (control_text.is_empty() && control_has_elements && !test_has_elements)
        || (test_text.is_empty() && test_has_elements && !control_has_elements);

    if element_vs_text {
        let category = |text: &str| if text.is_empty() { "element" } else { "text" };
        return Some(ComparisonEvent::different(
            ComparisonKind::NodeType,
            Location::path_only(control_path).with_value(category(control_text)),
            Location::path_only(test_path).with_value(category(test_text)),
        ));
    }

    Some(ComparisonEvent::different(
        ComparisonKind::TextValue,
        Location::at(control_path, Target::Text(control_text.to_string())).with_value(control_text),
        Location::at(test_path, Target::Text(test_text.to_string())).with_value(test_text),
    ))
}

fn attribute_location(element_path: &str, owner: &XmlElement, attr: &Attribute) -> Location {
    Location::at(
        join_attribute_path(element_path, &attr.name),
        Target::Attribute {
            attribute: attr.clone(),
            owner: owner.clone(),
        },
    )
    .with_value(attr.value.as_str())
}

fn element_location(tree: &Tree, id: NodeId, path: String) -> Location {
    match tree.element(id) {
        Some(element) => Location::at(path, Target::Element(element.clone())),
        None => Location::path_only(path),
    }
}

fn find_attribute<'e>(element: &'e XmlElement, name: &str) -> Option<&'e Attribute> {
    element.attributes().iter().find(|a| a.name == name)
}

/// Returns the schema-hint kind for `xsi:schemaLocation` style attributes.
fn schema_kind(tree: &Tree, owner: NodeId, attr: &Attribute) -> Option<ComparisonKind> {
    let prefix = attr.prefix()?;
    let is_xsi = match tree.resolve_prefix(owner, prefix) {
        Some(uri) => uri == XSI_NAMESPACE,
        None => prefix == "xsi",
    };
    if !is_xsi {
        return None;
    }

    match attr.local_name() {
        SCHEMA_LOCATION_ATTR => Some(ComparisonKind::SchemaLocation),
        NO_NAMESPACE_SCHEMA_LOCATION_ATTR => Some(ComparisonKind::NoNamespaceSchemaLocation),
        _ => None,
    }
}
