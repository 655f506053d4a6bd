// SPDX-License-Identifier: AGPL-3.0-or-later
//! Grouping of sibling leaves by their leading mark
//!
//! # The High-Level Concept
//!
//! Turning per-leaf marks into wrapper nodes means finding, among a list of
//! siblings, the stretches that share the same outermost mark. Each stretch
//! becomes one wrapper whose children are built from the same leaves with
//! that mark peeled off.
//!
//! # The Algorithm
//!
//! 1. **Scan:** walk the siblings left to right, comparing each one with the
//!    sibling placed just before it.
//!    - Both have no marks left: same run.
//!    - Both have marks left and their first marks are equal: same run.
//!    - Anything else starts a new run.
//! 2. **Peel:** for a run whose leaves still carry marks, drop the first mark
//!    of every leaf and recurse on the reduced run.
//! 3. **Wrap:** hand the recursively built children to the handler of the
//!    peeled mark.
//!
//! Only neighbours are compared. Two equal marks separated by a leaf without
//! them end up in separate runs, which keeps every wrapper contiguous.
//!
//! This module holds the scan; peeling and wrapping live in
//! [`ToNestedContext::hydrate_marks`](crate::ToNestedContext::hydrate_marks).

use crate::ast::{FlatNode, Mark};

/// A leaf paired with the marks that have not been turned into wrappers yet
#[derive(Debug, Clone, Copy)]
pub struct MarkedLeaf<'a> {
    pub node: &'a FlatNode,
    pub marks: &'a [Mark],
}

impl<'a> MarkedLeaf<'a> {
    pub fn new(node: &'a FlatNode) -> Self {
        Self {
            node,
            marks: &node.marks,
        }
    }

    /// The same leaf with its outermost remaining mark removed
    pub fn peel(self) -> Self {
        Self {
            node: self.node,
            marks: self.marks.get(1..).unwrap_or_default(),
        }
    }
}

/// Split `items` into maximal runs that share a leading mark
///
/// Every returned slice is non-empty and the slices cover `items` in order.
pub fn partition_runs<'s, T, M, F>(items: &'s [T], marks_of: F) -> Vec<&'s [T]>
where
    M: PartialEq,
    F: Fn(&T) -> &[M],
{
    let mut runs = Vec::new();
    let mut start = 0;

    for i in 1..items.len() {
        if !same_run(marks_of(&items[i - 1]), marks_of(&items[i])) {
            runs.push(&items[start..i]);
            start = i;
        }
    }
    if start < items.len() {
        runs.push(&items[start..]);
    }

    runs
}

fn same_run<M: PartialEq>(prev: &[M], next: &[M]) -> bool {
    match (prev.first(), next.first()) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lens(runs: &[&[Vec<u8>]]) -> Vec<usize> {
        runs.iter().map(|r| r.len()).collect()
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<Vec<u8>> = vec![];
        assert!(partition_runs(&items, |m| m.as_slice()).is_empty());
    }

    #[test]
    fn test_unmarked_leaves_share_a_run() {
        let items = vec![vec![], vec![], vec![]];
        let runs = partition_runs(&items, |m: &Vec<u8>| m.as_slice());
        assert_eq!(lens(&runs), vec![3]);
    }

    #[test]
    fn test_shared_leading_mark() {
        // [X, Y] [X] [Y]
        let items = vec![vec![1, 2], vec![1], vec![2]];
        let runs = partition_runs(&items, |m: &Vec<u8>| m.as_slice());
        assert_eq!(lens(&runs), vec![2, 1]);
    }

    #[test]
    fn test_non_adjacent_marks_never_merge() {
        let items = vec![vec![1], vec![], vec![1]];
        let runs = partition_runs(&items, |m: &Vec<u8>| m.as_slice());
        assert_eq!(lens(&runs), vec![1, 1, 1]);
    }

    #[test]
    fn test_marked_leaf_peel() {
        let node = FlatNode::text("x").with_marks(vec![Mark::new("strong"), Mark::new("em")]);
        let leaf = MarkedLeaf::new(&node);
        assert_eq!(leaf.marks.len(), 2);

        let once = leaf.peel();
        assert_eq!(once.marks, &[Mark::new("em")]);
        assert!(once.peel().peel().marks.is_empty());
    }

    proptest! {
        #[test]
        fn runs_cover_input_in_order(items in prop::collection::vec(prop::collection::vec(0u8..3, 0..3), 0..24)) {
            let runs = partition_runs(&items, |m: &Vec<u8>| m.as_slice());
            let rejoined: Vec<Vec<u8>> = runs.iter().flat_map(|r| r.iter().cloned()).collect();
            prop_assert_eq!(rejoined, items.clone());
            prop_assert!(runs.iter().all(|r| !r.is_empty()));
        }

        #[test]
        fn runs_are_homogeneous_and_maximal(items in prop::collection::vec(prop::collection::vec(0u8..3, 0..3), 1..24)) {
            let runs = partition_runs(&items, |m: &Vec<u8>| m.as_slice());
            for run in &runs {
                let head = run[0].first();
                prop_assert!(run.iter().all(|m| m.first() == head));
            }
            for pair in runs.windows(2) {
                let last = pair[0][pair[0].len() - 1].first();
                let next = pair[1][0].first();
                prop_assert_ne!(last, next);
            }
        }
    }
}
