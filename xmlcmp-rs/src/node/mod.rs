//! Node structures for XML tree representation.
//!
//! A parsed document is a [`Tree`]: an arena of nodes addressed by
//! [`NodeId`]. Every node knows its parent, so the enclosing element of any
//! node can be recovered without walking the tree from the root.

mod xml_content;

pub use xml_content::{
    is_xml_whitespace, normalize_whitespace, Attribute, XmlContent, XmlElement, XmlText,
};

use std::fmt;

use rustc_hash::FxHashMap;

use crate::constants::{ATTRIBUTE_PATH_PREFIX, PATH_SEPARATOR};

/// Appends an element step to a path.
pub fn join_path(parent: &str, step: &str) -> String {
    let mut path = String::with_capacity(parent.len() + step.len() + 1);
    path.push_str(parent);
    path.push(PATH_SEPARATOR);
    path.push_str(step);
    path
}

/// Appends an attribute step to an element path, e.g. `/root/@id`.
pub fn join_attribute_path(element_path: &str, name: &str) -> String {
    format!(
        "{}{}{}{}",
        element_path, PATH_SEPARATOR, ATTRIBUTE_PATH_PREFIX, name
    )
}

/// Index of a node within its [`Tree`].
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the parse tree.
///
/// Each node has:
/// - 0 or more children (text nodes never have children)
/// - XML content (element or text)
/// - A parent (except for the root)
#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content: XmlContent,
}

impl Node {
    /// Returns the parent node id.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the node content.
    pub fn content(&self) -> &XmlContent {
        &self.content
    }
}

/// A parsed XML document.
///
/// The root is always an element. Nodes are only ever appended, so a
/// `NodeId` stays valid for the lifetime of the tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree consisting of a single root element.
    pub fn new(root: XmlElement) -> Self {
        Tree {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                content: XmlContent::Element(root),
            }],
        }
    }

    /// Returns the id of the root element.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Returns the node with the given id, if it belongs to this tree.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Appends a child to `parent` and returns its id.
    ///
    /// Adjacent text children are merged, so an element never has two text
    /// children in a row.
    pub fn add_child(&mut self, parent: NodeId, content: XmlContent) -> NodeId {
        if let XmlContent::Text(text) = &content {
            let last = self.nodes[parent.0].children.last().copied();
            if let Some(last) = last {
                if let XmlContent::Text(existing) = &mut self.nodes[last.0].content {
                    existing.push_str(text.text());
                    return last;
                }
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            content,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Returns the element at `id`, or `None` for text nodes.
    pub fn element(&self, id: NodeId) -> Option<&XmlElement> {
        self.get(id).and_then(|n| n.content.as_element())
    }

    /// Returns the parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Returns the element children of `id` in document order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes[c.0].content.is_element())
            .collect()
    }

    /// Returns the concatenation of the direct text children of `id`.
    ///
    /// Text of descendant elements is not included.
    pub fn direct_text(&self, id: NodeId) -> String {
        self.node(id)
            .children
            .iter()
            .filter_map(|c| self.nodes[c.0].content.as_text())
            .map(XmlText::text)
            .collect()
    }

    /// Returns the whitespace-normalized direct text of `id`.
    pub fn normalized_text(&self, id: NodeId) -> String {
        normalize_whitespace(&self.direct_text(id))
    }

    /// Returns the path of `id`, e.g. `/root/item` or `/root/item[2]`.
    ///
    /// A positional index is added to a step only when the parent has more
    /// than one element child with the same name.
    pub fn path(&self, id: NodeId) -> String {
        let mut steps = Vec::new();
        let mut current = Some(id);

        while let Some(node_id) = current {
            let node = self.node(node_id);
            match &node.content {
                XmlContent::Element(element) => steps.push(self.path_step(node_id, element)),
                XmlContent::Text(_) => steps.push("text()".to_string()),
            }
            current = node.parent;
        }

        let mut path = String::new();
        for step in steps.iter().rev() {
            path.push(PATH_SEPARATOR);
            path.push_str(step);
        }
        path
    }

    /// Returns the path of an attribute of element `id`, e.g. `/root/@id`.
    pub fn attribute_path(&self, id: NodeId, name: &str) -> String {
        join_attribute_path(&self.path(id), name)
    }

    /// Returns the element children of `id` with their path steps, in
    /// document order.
    ///
    /// Steps follow the same rules as [`Tree::path`] but are computed in one
    /// pass over the children.
    pub fn child_steps(&self, id: NodeId) -> Vec<(NodeId, String)> {
        let children: Vec<(NodeId, &str)> = self
            .element_children(id)
            .into_iter()
            .filter_map(|c| self.element(c).map(|e| (c, e.qname())))
            .collect();

        let mut totals: FxHashMap<&str, usize> = FxHashMap::default();
        for (_, name) in &children {
            *totals.entry(*name).or_default() += 1;
        }

        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        children
            .into_iter()
            .map(|(child, name)| {
                let position = seen.entry(name).or_default();
                *position += 1;
                let step = if totals.get(name).copied().unwrap_or(0) > 1 {
                    format!("{}[{}]", name, position)
                } else {
                    name.to_string()
                };
                (child, step)
            })
            .collect()
    }

    fn path_step(&self, id: NodeId, element: &XmlElement) -> String {
        let Some(parent) = self.node(id).parent else {
            return element.qname().to_string();
        };

        let mut position = 0;
        let mut same_name = 0;
        for sibling in &self.node(parent).children {
            if let Some(e) = self.element(*sibling) {
                if e.qname() == element.qname() {
                    same_name += 1;
                    if *sibling == id {
                        position = same_name;
                    }
                }
            }
        }

        if same_name > 1 {
            format!("{}[{}]", element.qname(), position)
        } else {
            element.qname().to_string()
        }
    }

    /// Resolves a namespace prefix in scope at `id`.
    ///
    /// The empty prefix resolves the default namespace. Declarations on the
    /// nearest ancestor-or-self win.
    pub fn resolve_prefix(&self, id: NodeId, prefix: &str) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(uri) = self
                .element(node_id)
                .and_then(|e| e.namespace_decls().get(prefix))
            {
                return Some(uri.as_str());
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Iterates over all nodes in document (depth-first, pre-order) order.
    pub fn descendants(&self) -> DfsTreeIterator<'_> {
        DfsTreeIterator::new(self, self.root())
    }

    /// Returns the number of element nodes.
    pub fn element_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.content.is_element()).count()
    }
}

/// Iterator for traversing a tree in depth-first order.
pub struct DfsTreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> DfsTreeIterator<'a> {
    /// Creates a new DFS iterator starting at the given node.
    pub fn new(tree: &'a Tree, start: NodeId) -> Self {
        DfsTreeIterator {
            tree,
            stack: vec![start],
        }
    }
}

impl Iterator for DfsTreeIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(id).children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> XmlContent {
        XmlContent::Element(XmlElement::new(name, Vec::new()))
    }

    fn text(value: &str) -> XmlContent {
        XmlContent::Text(XmlText::new(value))
    }

    #[test]
    fn test_dfs_iterator_tree() {
        // Build tree:
        //       root
        //      /    \
        //     a      b
        //    / \
        //   c   d
        let mut tree = Tree::new(XmlElement::new("root", Vec::new()));
        let root = tree.root();
        let a = tree.add_child(root, element("a"));
        tree.add_child(root, element("b"));
        tree.add_child(a, element("c"));
        tree.add_child(a, element("d"));

        let names: Vec<&str> = tree
            .descendants()
            .filter_map(|id| tree.element(id))
            .map(XmlElement::qname)
            .collect();

        assert_eq!(names, vec!["root", "a", "c", "d", "b"]);
        assert_eq!(tree.element_count(), 5);
    }

    #[test]
    fn test_paths() {
        let mut tree = Tree::new(XmlElement::new("root", Vec::new()));
        let root = tree.root();
        let first = tree.add_child(root, element("item"));
        let second = tree.add_child(root, element("item"));
        let other = tree.add_child(root, element("other"));
        let leaf = tree.add_child(other, element("leaf"));

        assert_eq!(tree.path(root), "/root");
        assert_eq!(tree.path(first), "/root/item[1]");
        assert_eq!(tree.path(second), "/root/item[2]");
        assert_eq!(tree.path(leaf), "/root/other/leaf");
        assert_eq!(tree.attribute_path(other, "id"), "/root/other/@id");
        assert_eq!(tree.parent(leaf), Some(other));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn test_child_steps_agree_with_paths() {
        let mut tree = Tree::new(XmlElement::new("root", Vec::new()));
        let root = tree.root();
        tree.add_child(root, element("item"));
        tree.add_child(root, text("between"));
        tree.add_child(root, element("other"));
        tree.add_child(root, element("item"));

        let steps = tree.child_steps(root);
        let names: Vec<&str> = steps.iter().map(|(_, step)| step.as_str()).collect();
        assert_eq!(names, vec!["item[1]", "other", "item[2]"]);
        for (child, step) in &steps {
            assert_eq!(join_path(&tree.path(root), step), tree.path(*child));
        }
        assert_eq!(join_attribute_path("/root/other", "id"), "/root/other/@id");
    }

    #[test]
    fn test_direct_text_excludes_descendants() {
        let mut tree = Tree::new(XmlElement::new("root", Vec::new()));
        let root = tree.root();
        tree.add_child(root, text("  hello "));
        let child = tree.add_child(root, element("child"));
        tree.add_child(child, text("nested"));
        tree.add_child(root, text("  world"));

        assert_eq!(tree.direct_text(root), "  hello   world");
        assert_eq!(tree.normalized_text(root), "hello world");
        assert_eq!(tree.element_children(root), vec![child]);
    }

    #[test]
    fn test_resolve_prefix_walks_ancestors() {
        let mut decls = std::collections::HashMap::new();
        decls.insert("xsi".to_string(), "urn:xsi".to_string());
        let mut tree = Tree::new(XmlElement::new_with_namespace("root", decls, Vec::new()));
        let child = tree.add_child(tree.root(), element("child"));

        assert_eq!(tree.resolve_prefix(child, "xsi"), Some("urn:xsi"));
        assert_eq!(tree.resolve_prefix(child, "other"), None);
        assert_eq!(tree.resolve_prefix(child, ""), None);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let mut tree = Tree::new(XmlElement::new("root", Vec::new()));
        let root = tree.root();
        let t1 = tree.add_child(root, text("a "));
        let t2 = tree.add_child(root, text("& b"));

        assert_eq!(t1, t2);
        assert_eq!(tree.node(root).children().len(), 1);
        assert_eq!(tree.direct_text(root), "a & b");
    }
}
