//! Tri-state selection propagation across the tree and the extension index.

use crate::annotate;
use crate::domain::{NodeChange, NodeId, TriState};
use crate::tree::{extension_key, ExtensionFilterIndex, NodeKind, TreeModel};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::warn;

/// Result of a toggle request. Bad references are reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ToggleOutcome {
    Applied,
    /// The handle, path or extension is not part of the current tree/index.
    UnknownNode,
    /// The handle exists but names a directory where a leaf was expected, or
    /// the other way round.
    WrongKind,
}

/// Tri-state of a parent given its direct children's states.
pub fn tri_state<I>(children: I) -> TriState
where
    I: IntoIterator<Item = TriState>,
{
    let (mut selected, mut indeterminate, mut total) = (0usize, 0usize, 0usize);
    for state in children {
        total += 1;
        match state {
            TriState::Selected => selected += 1,
            TriState::Indeterminate => indeterminate += 1,
            TriState::Unselected => {}
        }
    }
    if indeterminate > 0 {
        TriState::Indeterminate
    } else if selected == 0 {
        TriState::Unselected
    } else if selected == total {
        TriState::Selected
    } else {
        TriState::Indeterminate
    }
}

/// Recompute a directory's state from its direct children only.
pub fn recompute_selection(tree: &TreeModel, dir: usize) -> TriState {
    tri_state(tree.node(dir).children.iter().map(|&c| tree.node(c).tri_state()))
}

/// Applies user and bulk selection actions to one tree generation.
///
/// Every operation finishes selection propagation for all affected
/// directories before any aggregate is recomputed.
pub struct SelectionController<'a> {
    tree: &'a mut TreeModel,
    index: &'a mut ExtensionFilterIndex,
    changes: &'a mut Vec<NodeChange>,
}

impl<'a> SelectionController<'a> {
    pub fn new(
        tree: &'a mut TreeModel,
        index: &'a mut ExtensionFilterIndex,
        changes: &'a mut Vec<NodeChange>,
    ) -> Self {
        Self { tree, index, changes }
    }

    pub fn toggle_leaf(&mut self, leaf: NodeId, checked: bool) -> ToggleOutcome {
        let Some(index) = self.tree.resolve(leaf) else {
            warn!("toggle_leaf: unknown node {:?}", leaf);
            return ToggleOutcome::UnknownNode;
        };
        if !self.tree.node(index).is_leaf() {
            warn!("toggle_leaf: {} is a directory", self.tree.node(index).path);
            return ToggleOutcome::WrongKind;
        }

        self.set_leaves(&[index], checked);
        let dirs: Vec<usize> = self.tree.ancestors(index).collect();
        self.settle(dirs);
        ToggleOutcome::Applied
    }

    pub fn toggle_directory(&mut self, dir: NodeId, checked: bool) -> ToggleOutcome {
        let Some(index) = self.tree.resolve(dir) else {
            warn!("toggle_directory: unknown node {:?}", dir);
            return ToggleOutcome::UnknownNode;
        };
        if self.tree.node(index).is_leaf() {
            warn!("toggle_directory: {} is a file", self.tree.node(index).path);
            return ToggleOutcome::WrongKind;
        }

        let (leaves, mut dirs): (Vec<usize>, Vec<usize>) =
            self.tree.subtree(index).into_iter().partition(|&i| self.tree.node(i).is_leaf());
        self.set_leaves(&leaves, checked);
        dirs.extend(self.tree.ancestors(index));
        self.settle(dirs);
        ToggleOutcome::Applied
    }

    pub fn toggle_extension(&mut self, ext: &str, checked: bool) -> ToggleOutcome {
        let Some(leaves) = self.index.leaves_of(ext).map(<[usize]>::to_vec) else {
            warn!("toggle_extension: unknown extension {:?}", ext);
            return ToggleOutcome::UnknownNode;
        };

        self.set_leaves(&leaves, checked);
        let parents: BTreeSet<usize> = leaves.iter().filter_map(|&l| self.tree.node(l).parent).collect();
        let mut dirs = Vec::new();
        for parent in parents {
            dirs.push(parent);
            dirs.extend(self.tree.ancestors(parent));
        }
        self.settle(dirs);
        ToggleOutcome::Applied
    }

    fn set_leaves(&mut self, leaves: &[usize], checked: bool) {
        let mut touched_extensions = BTreeSet::new();
        for &leaf in leaves {
            let node = self.tree.node_mut(leaf);
            if let NodeKind::Leaf { selected, .. } = &mut node.kind {
                if *selected != checked {
                    *selected = checked;
                    touched_extensions.insert(extension_key(&node.name));
                    self.changes.push(self.tree.change_for(leaf));
                }
            }
        }
        for ext in touched_extensions {
            self.index.refresh(self.tree, &ext);
        }
    }

    /// Recompute selection, then aggregates, once per unique directory, deepest first.
    fn settle(&mut self, mut dirs: Vec<usize>) {
        dirs.sort_unstable();
        dirs.dedup();
        dirs.sort_by_key(|&d| Reverse(self.tree.node(d).depth));

        let before = self.tree.snapshot(&dirs);
        for &dir in &dirs {
            let state = recompute_selection(self.tree, dir);
            if let NodeKind::Directory { selection, .. } = &mut self.tree.node_mut(dir).kind {
                *selection = state;
            }
        }
        annotate::refresh(self.tree, &dirs);
        self.tree.record_diffs(before, self.changes);
    }
}
