//! Flat grouping of leaves by file extension.

use super::TreeModel;
use crate::domain::{ExtensionSummary, TriState};
use crate::select::tri_state;
use std::collections::BTreeMap;

/// Lower-cased suffix after the last `.` of the final path segment, or `""`.
pub fn extension_key(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default)]
struct ExtensionGroup {
    leaves: Vec<usize>,
    state: TriState,
}

/// Partition of all leaves keyed by [`extension_key`], with a derived tri-state
/// per group that ignores the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilterIndex {
    groups: BTreeMap<String, ExtensionGroup>,
}

impl ExtensionFilterIndex {
    /// Group every leaf of `tree`. Within a group, leaves keep build order.
    pub fn build(tree: &TreeModel) -> Self {
        let mut groups: BTreeMap<String, ExtensionGroup> = BTreeMap::new();
        for leaf in tree.leaves() {
            let key = extension_key(&tree.node(leaf).name);
            groups.entry(key).or_default().leaves.push(leaf);
        }
        let mut index = Self { groups };
        let keys: Vec<String> = index.groups.keys().cloned().collect();
        for key in keys {
            index.refresh(tree, &key);
        }
        index
    }

    pub(crate) fn leaves_of(&self, ext: &str) -> Option<&[usize]> {
        self.groups.get(ext).map(|g| g.leaves.as_slice())
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.groups.contains_key(ext)
    }

    /// Extensions ordered by leaf count (descending), then name.
    pub fn all_extensions(&self) -> Vec<String> {
        let mut keys: Vec<(&String, usize)> =
            self.groups.iter().map(|(k, g)| (k, g.leaves.len())).collect();
        keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        keys.into_iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn state(&self, ext: &str) -> Option<TriState> {
        self.groups.get(ext).map(|g| g.state)
    }

    pub fn summaries(&self) -> BTreeMap<String, ExtensionSummary> {
        self.groups
            .iter()
            .map(|(k, g)| (k.clone(), ExtensionSummary { state: g.state, count: g.leaves.len() }))
            .collect()
    }

    /// Recompute the group tri-state of `ext` from its leaves' current selection.
    pub(crate) fn refresh(&mut self, tree: &TreeModel, ext: &str) {
        if let Some(group) = self.groups.get_mut(ext) {
            group.state = tri_state(group.leaves.iter().map(|&i| tree.node(i).tri_state()));
        }
    }
}
