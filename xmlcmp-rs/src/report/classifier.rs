//! Turns raw comparison events into difference records.

use crate::compare::{ComparisonEvent, ComparisonKind, Location, Outcome, Target};

use super::{DifferenceCategory, DifferenceRecord};

/// Rendering used for a value that does not exist on one side.
const ABSENT: &str = "<absent>";

/// Classifies a single event.
///
/// Returns `None` for events that are not differences: outcomes other than
/// [`Outcome::Different`] and noise kinds (see [`ComparisonKind::is_noise`]).
pub fn classify(event: &ComparisonEvent) -> Option<DifferenceRecord> {
    if event.outcome != Outcome::Different || event.kind.is_noise() {
        return None;
    }

    let record = match event.kind {
        ComparisonKind::AttrValue => attribute_value(event),
        _ if targets_attribute(event) => attribute(event),
        ComparisonKind::TextValue => text_value(event),
        ComparisonKind::ChildLookup => child_lookup(event),
        _ => other(event),
    };
    Some(record)
}

fn targets_attribute(event: &ComparisonEvent) -> bool {
    let is_attr = |loc: &Location| matches!(loc.target, Some(Target::Attribute { .. }));
    is_attr(&event.control) || is_attr(&event.test)
}

fn attribute_value(event: &ComparisonEvent) -> DifferenceRecord {
    let name = attribute_name(event);
    let message = format!(
        "Attribute value mismatch at {}: attribute '{}' expected {} but found {} (control element: {}, test element: {})",
        path_of(event),
        name,
        quoted(&event.control),
        quoted(&event.test),
        owner_of(&event.control),
        owner_of(&event.test),
    );
    DifferenceRecord::new(DifferenceCategory::AttributeValue, message)
}

fn attribute(event: &ComparisonEvent) -> DifferenceRecord {
    let message = format!(
        "Attribute mismatch at {}: attribute '{}' expected {} but found {}",
        path_of(event),
        attribute_name(event),
        quoted(&event.control),
        quoted(&event.test),
    );
    DifferenceRecord::new(DifferenceCategory::Attribute, message)
}

fn text_value(event: &ComparisonEvent) -> DifferenceRecord {
    let message = format!(
        "Text mismatch at {}: expected {} but found {}",
        path_of(event),
        quoted(&event.control),
        quoted(&event.test),
    );
    DifferenceRecord::new(DifferenceCategory::Value, message)
}

fn child_lookup(event: &ComparisonEvent) -> DifferenceRecord {
    let control = event.control.target.as_ref().and_then(Target::as_element);
    let test = event.test.target.as_ref().and_then(Target::as_element);

    match (control, test, &event.control.path, &event.test.path) {
        (Some(control), Some(test), _, _) => DifferenceRecord::new(
            DifferenceCategory::StructureUnmatched,
            format!(
                "Unmatched element at {}: no test element has the same name and attributes, \
                 most likely an attribute or value differs; inspect the attributes \
                 (control element: {}, test element: {})",
                path_of(event),
                control,
                test,
            ),
        ),
        (_, _, Some(path), None) => {
            let mut message = format!(
                "Missing element at {}: {} is not present in the test document",
                path,
                element_or_path(&event.control, path),
            );
            if let Some(text) = &event.test.value {
                message.push_str(&format!(" (test has text \"{}\" instead)", text));
            }
            DifferenceRecord::new(DifferenceCategory::StructureMissing, message)
        }
        (_, _, None, Some(path)) => {
            let mut message = format!(
                "Extra element at {}: {} is not present in the control document",
                path,
                element_or_path(&event.test, path),
            );
            if let Some(text) = &event.control.value {
                message.push_str(&format!(" (it replaces control text \"{}\")", text));
            }
            DifferenceRecord::new(DifferenceCategory::StructureExtra, message)
        }
        _ => DifferenceRecord::new(
            DifferenceCategory::StructureOther,
            format!(
                "Could not match element between {} and {}",
                path_or_unknown(&event.control),
                path_or_unknown(&event.test),
            ),
        ),
    }
}

fn other(event: &ComparisonEvent) -> DifferenceRecord {
    let mut message = format!(
        "Structural difference ({}) between {} and {}",
        event.kind,
        path_or_unknown(&event.control),
        path_or_unknown(&event.test),
    );
    if event.control.value.is_some() || event.test.value.is_some() {
        message.push_str(&format!(
            ": expected {} but found {}",
            quoted(&event.control),
            quoted(&event.test)
        ));
    }
    DifferenceRecord::new(DifferenceCategory::StructureOther, message)
}

/// Path of the event, preferring the control side.
fn path_of(event: &ComparisonEvent) -> &str {
    event
        .control
        .path
        .as_deref()
        .or(event.test.path.as_deref())
        .unwrap_or("?")
}

fn path_or_unknown(loc: &Location) -> &str {
    loc.path.as_deref().unwrap_or("<unknown>")
}

fn attribute_name(event: &ComparisonEvent) -> &str {
    [&event.control, &event.test]
        .into_iter()
        .filter_map(|loc| loc.target.as_ref().and_then(Target::as_attribute))
        .map(|(attr, _)| attr.name.as_str())
        .next()
        .unwrap_or("?")
}

fn quoted(loc: &Location) -> String {
    match &loc.value {
        Some(value) => format!("\"{}\"", value),
        None => ABSENT.to_string(),
    }
}

fn owner_of(loc: &Location) -> String {
    loc.target
        .as_ref()
        .and_then(Target::as_attribute)
        .map(|(_, owner)| owner.to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

fn element_or_path(loc: &Location, path: &str) -> String {
    loc.target
        .as_ref()
        .and_then(Target::as_element)
        .map(ToString::to_string)
        .unwrap_or_else(|| path.to_string())
}
