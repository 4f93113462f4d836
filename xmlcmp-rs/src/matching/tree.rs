//! Depth-first pairing of the elements of two trees.
//!
//! The roots are always paired. Below a paired parent, element children are
//! paired in three passes, each only considering children left over from
//! the previous one:
//!
//! 1. children with identical subtrees (found through a fingerprint index)
//!    that the selector accepts
//! 2. children the selector accepts
//! 3. optionally, children with the same name (near matches)
//!
//! Whatever remains is missing (control side) or extra (test side).

use md5::{Digest, Md5};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::ElementSelector;
use crate::node::{NodeId, Tree};

/// How a control element came to be paired with a test element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The two document roots, compared unconditionally.
    Root,
    /// Accepted by the element selector.
    Strict,
    /// Rejected by the selector but left over with the same name on both sides.
    Near,
}

/// A paired control and test element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    /// Element in the control tree.
    pub control: NodeId,
    /// Element in the test tree.
    pub test: NodeId,
    /// How the pair was established.
    pub kind: MatchKind,
}

/// Outcome of pairing the element children of one matched parent pair.
#[derive(Debug, Clone, Default)]
pub struct ChildMatching {
    pairs: Vec<MatchedPair>,
    missing: Vec<NodeId>,
    extra: Vec<NodeId>,
}

impl ChildMatching {
    /// Returns the paired children in control document order.
    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    /// Returns control children without a counterpart, in document order.
    pub fn missing(&self) -> &[NodeId] {
        &self.missing
    }

    /// Returns test children without a counterpart, in document order.
    pub fn extra(&self) -> &[NodeId] {
        &self.extra
    }
}

/// The full pairing between a control tree and a test tree.
#[derive(Debug, Clone, Default)]
pub struct TreeMatching {
    control_to_test: FxHashMap<NodeId, MatchedPair>,
    test_to_control: FxHashMap<NodeId, NodeId>,
    children: FxHashMap<NodeId, ChildMatching>,
}

impl TreeMatching {
    /// Builds the pairing, reporting leftover same-name elements as near
    /// matches.
    pub fn build(control: &Tree, test: &Tree, selector: &dyn ElementSelector) -> Self {
        Self::build_with(control, test, selector, true)
    }

    /// Builds the pairing. With `pair_near` unset, elements rejected by the
    /// selector are always missing or extra.
    pub fn build_with(
        control: &Tree,
        test: &Tree,
        selector: &dyn ElementSelector,
        pair_near: bool,
    ) -> Self {
        let control_prints = subtree_fingerprints(control);
        let test_prints = subtree_fingerprints(test);

        let mut matching = TreeMatching::default();
        let root_pair = MatchedPair {
            control: control.root(),
            test: test.root(),
            kind: MatchKind::Root,
        };
        matching.add_pair(root_pair);

        let mut queue = vec![root_pair];
        while let Some(pair) = queue.pop() {
            let children = match_children(
                control,
                test,
                pair,
                selector,
                pair_near,
                (control_prints.as_slice(), test_prints.as_slice()),
            );
            for child_pair in &children.pairs {
                matching.add_pair(*child_pair);
                queue.push(*child_pair);
            }
            matching.children.insert(pair.control, children);
        }

        debug!(
            selector = selector.name(),
            pairs = matching.control_to_test.len(),
            near = matching.near_count(),
            missing = matching.missing_count(),
            extra = matching.extra_count(),
            "trees matched"
        );
        matching
    }

    fn add_pair(&mut self, pair: MatchedPair) {
        self.control_to_test.insert(pair.control, pair);
        self.test_to_control.insert(pair.test, pair.control);
    }

    /// Returns the pair a control element belongs to.
    pub fn pair(&self, control: NodeId) -> Option<MatchedPair> {
        self.control_to_test.get(&control).copied()
    }

    /// Returns the test element paired with a control element.
    pub fn partner(&self, control: NodeId) -> Option<NodeId> {
        self.pair(control).map(|p| p.test)
    }

    /// Returns the control element paired with a test element.
    pub fn control_partner(&self, test: NodeId) -> Option<NodeId> {
        self.test_to_control.get(&test).copied()
    }

    /// Returns how the children of a paired control element were matched.
    pub fn children(&self, control_parent: NodeId) -> Option<&ChildMatching> {
        self.children.get(&control_parent)
    }

    /// Number of near-matched pairs.
    pub fn near_count(&self) -> usize {
        self.control_to_test
            .values()
            .filter(|p| p.kind == MatchKind::Near)
            .count()
    }

    /// Number of unmatched control elements directly below paired parents.
    pub fn missing_count(&self) -> usize {
        self.children.values().map(|c| c.missing.len()).sum()
    }

    /// Number of unmatched test elements directly below paired parents.
    pub fn extra_count(&self) -> usize {
        self.children.values().map(|c| c.extra.len()).sum()
    }
}

/// Pairs the element children of one matched parent pair.
fn match_children(
    control: &Tree,
    test: &Tree,
    parent: MatchedPair,
    selector: &dyn ElementSelector,
    pair_near: bool,
    (control_prints, test_prints): (&[[u8; 16]], &[[u8; 16]]),
) -> ChildMatching {
    let control_children = control.element_children(parent.control);
    let test_children = test.element_children(parent.test);

    let mut assigned: Vec<Option<(usize, MatchKind)>> = vec![None; control_children.len()];
    let mut test_used = vec![false; test_children.len()];

    let accepts = |i: usize, j: usize| match (
        control.element(control_children[i]),
        test.element(test_children[j]),
    ) {
        (Some(c), Some(t)) => selector.can_be_compared(c, t),
        _ => false,
    };

    // Identical subtrees first, so reordered duplicates pair up with their twins
    // Each bucket keeps a cursor past its used prefix, so runs of identical
    // twins are paired in linear time
    let mut print_index: FxHashMap<[u8; 16], (Vec<usize>, usize)> = FxHashMap::default();
    for (j, id) in test_children.iter().enumerate() {
        print_index
            .entry(test_prints[id.index()])
            .or_default()
            .0
            .push(j);
    }
    for (i, id) in control_children.iter().enumerate() {
        let Some((candidates, cursor)) = print_index.get_mut(&control_prints[id.index()]) else {
            continue;
        };
        while *cursor < candidates.len() && test_used[candidates[*cursor]] {
            *cursor += 1;
        }
        if let Some(&j) = candidates[*cursor..]
            .iter()
            .find(|&&j| !test_used[j] && accepts(i, j))
        {
            assigned[i] = Some((j, MatchKind::Strict));
            test_used[j] = true;
        }
    }

    pair_leftovers(&mut assigned, &mut test_used, MatchKind::Strict, accepts);

    if pair_near {
        let same_name = |i: usize, j: usize| match (
            control.element(control_children[i]),
            test.element(test_children[j]),
        ) {
            (Some(c), Some(t)) => c.names_match(t),
            _ => false,
        };
        pair_leftovers(&mut assigned, &mut test_used, MatchKind::Near, same_name);
    }

    let mut result = ChildMatching::default();
    for (i, slot) in assigned.iter().enumerate() {
        match slot {
            Some((j, kind)) => result.pairs.push(MatchedPair {
                control: control_children[i],
                test: test_children[*j],
                kind: *kind,
            }),
            None => result.missing.push(control_children[i]),
        }
    }
    result.extra = test_children
        .iter()
        .zip(&test_used)
        .filter(|(_, used)| !**used)
        .map(|(id, _)| *id)
        .collect();
    result
}

/// Pairs each unassigned control child with the first unused test child
/// accepted by `accepts`.
fn pair_leftovers(
    assigned: &mut [Option<(usize, MatchKind)>],
    test_used: &mut [bool],
    kind: MatchKind,
    accepts: impl Fn(usize, usize) -> bool,
) {
    for (i, slot) in assigned.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }
        if let Some(j) = (0..test_used.len()).find(|&j| !test_used[j] && accepts(i, j)) {
            *slot = Some((j, kind));
            test_used[j] = true;
        }
    }
}

/// Computes an order-independent digest of every element subtree.
///
/// Two elements get the same fingerprint when they have the same name, the
/// same attribute set, the same normalized direct text and the same
/// multiset of child fingerprints. Text nodes get a zero fingerprint.
fn subtree_fingerprints(tree: &Tree) -> Vec<[u8; 16]> {
    let mut prints = vec![[0u8; 16]; tree.len()];
    let order: Vec<NodeId> = tree.descendants().collect();

    // Reverse pre-order visits every child before its parent
    for &id in order.iter().rev() {
        let Some(element) = tree.element(id) else {
            continue;
        };
        let mut child_prints: Vec<[u8; 16]> = tree
            .element_children(id)
            .iter()
            .map(|c| prints[c.index()])
            .collect();
        child_prints.sort_unstable();

        let text = tree.normalized_text(id);
        let mut hasher = Md5::new();
        hasher.update((element.qname().len() as u64).to_le_bytes());
        hasher.update(element.qname().as_bytes());
        hasher.update(element.attribute_digest());
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        for print in &child_prints {
            hasher.update(print);
        }
        prints[id.index()] = hasher.finalize().into();
    }

    prints
}
