//! Conversion of XML trees to JSON.
//!
//! The mapping follows the usual XML-to-JSON conventions:
//! - the root element becomes the top-level object (its name is dropped)
//! - attributes become fields
//! - element children become fields keyed by tag name; repeated names
//!   collapse into an array in document order
//! - an element with neither attributes nor element children becomes its
//!   trimmed text
//! - text mixed with attributes or children is stored under the `""` key

use serde_json::{Map, Value};

use crate::constants::JSON_TEXT_KEY;
use crate::node::{is_xml_whitespace, NodeId, Tree, XmlElement};

/// Converts a tree to a JSON value.
///
/// Elements are converted children first, so nesting depth does not
/// consume stack.
pub fn to_json(tree: &Tree) -> Value {
    let mut values: Vec<Option<Value>> = vec![None; tree.len()];
    let order: Vec<NodeId> = tree.descendants().collect();

    // Reverse pre-order visits every child before its parent
    for &id in order.iter().rev() {
        if let Some(element) = tree.element(id) {
            let value = element_to_json(tree, id, element, &mut values);
            values[id.index()] = Some(value);
        }
    }

    match values[tree.root().index()].take() {
        Some(Value::String(text)) if text.is_empty() => Value::Object(Map::new()),
        Some(value) => value,
        None => Value::Object(Map::new()),
    }
}

/// Converts a tree to pretty-printed JSON text.
pub fn to_json_string(tree: &Tree) -> String {
    // Serializing a `Value` cannot fail
    serde_json::to_string_pretty(&to_json(tree)).unwrap_or_default()
}

/// Builds the value of one element from the already converted values of
/// its children.
fn element_to_json(
    tree: &Tree,
    id: NodeId,
    element: &XmlElement,
    values: &mut [Option<Value>],
) -> Value {
    let children = tree.element_children(id);
    let text = tree.direct_text(id);
    let text = text.trim_matches(is_xml_whitespace);

    if element.attributes().is_empty() && children.is_empty() {
        return Value::String(text.to_string());
    }

    let mut object = Map::new();
    for attr in element.attributes() {
        object.insert(attr.name.clone(), Value::String(attr.value.clone()));
    }

    for child in children {
        let Some(name) = tree.element(child).map(|e| e.qname().to_string()) else {
            continue;
        };
        let value = values[child.index()].take().unwrap_or(Value::Null);
        match object.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                object.insert(name, value);
            }
        }
    }

    if !text.is_empty() {
        object.insert(JSON_TEXT_KEY.to_string(), Value::String(text.to_string()));
    }

    Value::Object(object)
}
