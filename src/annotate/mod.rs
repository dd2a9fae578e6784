//! Bottom-up rollup of per-leaf annotations into directory aggregates.
//!
//! Leaf annotations start as `Loading` and are resolved by messages from the
//! annotation-fetch collaborator (see [`runner`]). A directory aggregate only
//! looks at *selected* descendant leaves: any `Loading` wins, then any `Error`,
//! otherwise the values are summed.

pub mod runner;

use crate::domain::{Annotation, AnnotationResult, Generation, NodeChange, NodeId};
use crate::tree::{NodeKind, TreeModel};
use tracing::{debug, warn};

/// Result of applying an annotation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Resolution {
    Applied,
    /// Tagged with a superseded generation and dropped.
    Stale,
    /// The handle does not name a leaf of the current tree.
    UnknownNode,
}

/// Aggregate of `dir` over its selected descendant leaves.
///
/// Pure: reads the subtree, writes nothing.
pub fn recompute_aggregate(tree: &TreeModel, dir: usize) -> Annotation {
    let mut loading = false;
    let mut failed = false;
    let mut total = 0u64;
    for index in tree.subtree(dir) {
        let node = tree.node(index);
        if let NodeKind::Leaf { selected: true, annotation, .. } = &node.kind {
            match annotation {
                Annotation::Loading => loading = true,
                Annotation::Error => failed = true,
                Annotation::Value(n) => total = total.saturating_add(*n),
            }
        }
    }
    if loading {
        Annotation::Loading
    } else if failed {
        Annotation::Error
    } else {
        Annotation::Value(total)
    }
}

/// Write fresh aggregates for each directory in `dirs`.
pub(crate) fn refresh(tree: &mut TreeModel, dirs: &[usize]) {
    for &dir in dirs {
        let value = recompute_aggregate(tree, dir);
        if let NodeKind::Directory { aggregate, .. } = &mut tree.node_mut(dir).kind {
            *aggregate = value;
        }
    }
}

/// Applies annotation results to one tree generation.
pub struct AnnotationAggregator<'a> {
    tree: &'a mut TreeModel,
    changes: &'a mut Vec<NodeChange>,
}

impl<'a> AnnotationAggregator<'a> {
    pub fn new(tree: &'a mut TreeModel, changes: &'a mut Vec<NodeChange>) -> Self {
        Self { tree, changes }
    }

    /// Set a leaf's annotation and refresh every ancestor's aggregate.
    ///
    /// A result for another generation is dropped. A later result for the same
    /// leaf and generation replaces the earlier one (external re-fetch).
    pub fn resolve(&mut self, leaf: NodeId, generation: Generation, result: AnnotationResult) -> Resolution {
        if generation != self.tree.generation() {
            debug!(
                "dropping annotation for {:?}: generation {} superseded by {}",
                leaf,
                generation,
                self.tree.generation()
            );
            return Resolution::Stale;
        }
        let Some(index) = self.tree.resolve(leaf).filter(|&i| self.tree.node(i).is_leaf()) else {
            warn!("annotation for unknown leaf {:?}", leaf);
            return Resolution::UnknownNode;
        };

        let value = Annotation::from(result);
        let mut counted = false;
        if let NodeKind::Leaf { annotation, selected, .. } = &mut self.tree.node_mut(index).kind {
            if *annotation == value {
                return Resolution::Applied;
            }
            *annotation = value;
            counted = *selected;
        }
        self.changes.push(self.tree.change_for(index));

        // Aggregates only count selected leaves.
        if !counted {
            return Resolution::Applied;
        }
        let dirs: Vec<usize> = self.tree.ancestors(index).collect();
        self.recompute(&dirs);
        Resolution::Applied
    }

    /// Recompute aggregates of `dirs`, recording a change for each one that moved.
    pub(crate) fn recompute(&mut self, dirs: &[usize]) {
        let before = self.tree.snapshot(dirs);
        refresh(self.tree, dirs);
        self.tree.record_diffs(before, self.changes);
    }
}
