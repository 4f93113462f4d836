//! Element selectors decide which elements may be paired.

use crate::node::XmlElement;

/// Policy deciding whether a control element and a test element are
/// candidates for being compared with each other.
pub trait ElementSelector: Send + Sync {
    /// Short name of the policy, used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if `control` and `test` may be paired.
    fn can_be_compared(&self, control: &XmlElement, test: &XmlElement) -> bool;
}

/// Pairs elements with the same name and exactly the same attributes.
///
/// Attribute order is irrelevant. An element whose attributes differ in any
/// way is not a candidate, so attribute changes surface as lookup failures
/// rather than attribute differences.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByNameAndAllAttributes;

impl ElementSelector for ByNameAndAllAttributes {
    fn name(&self) -> &'static str {
        "name-and-all-attributes"
    }

    fn can_be_compared(&self, control: &XmlElement, test: &XmlElement) -> bool {
        control.content_equals(test)
    }
}

/// Pairs elements with the same qualified name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByName;

impl ElementSelector for ByName {
    fn name(&self) -> &'static str {
        "name"
    }

    fn can_be_compared(&self, control: &XmlElement, test: &XmlElement) -> bool {
        control.names_match(test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;

    #[test]
    fn test_strict_selector() {
        let a = XmlElement::new(
            "item",
            vec![Attribute::new("id", "1"), Attribute::new("k", "v")],
        );
        let reordered = XmlElement::new(
            "item",
            vec![Attribute::new("k", "v"), Attribute::new("id", "1")],
        );
        let changed = XmlElement::new(
            "item",
            vec![Attribute::new("id", "2"), Attribute::new("k", "v")],
        );
        let fewer = XmlElement::new("item", vec![Attribute::new("id", "1")]);

        assert!(ByNameAndAllAttributes.can_be_compared(&a, &reordered));
        assert!(!ByNameAndAllAttributes.can_be_compared(&a, &changed));
        assert!(!ByNameAndAllAttributes.can_be_compared(&a, &fewer));

        assert!(ByName.can_be_compared(&a, &changed));
        assert!(ByName.can_be_compared(&a, &fewer));
        assert!(!ByName.can_be_compared(&a, &XmlElement::new("other", Vec::new())));
    }
}
