//! Hierarchical node arena built from a flat repository listing.
//!
//! Nodes live in a single `Vec` and refer to each other by index, so parent
//! walks are plain lookups. The whole arena is rebuilt on every repository load.

pub mod extension;
pub mod order;

pub use extension::{extension_key, ExtensionFilterIndex};

use crate::domain::{Annotation, Entry, EntryKind, Generation, NodeChange, NodeId, TriState};
use order::{compare_segments, split_segments};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub(crate) const ROOT: usize = 0;

/// Validation failure while building a tree. No partial tree survives it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("listing entry #{index} has an empty path")]
    EmptyPath { index: usize },

    #[error("duplicate path in listing: {path}")]
    DuplicatePath { path: String },

    #[error("path {path} conflicts with existing {existing}")]
    PathConflict { path: String, existing: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Directory { selection: TriState, aggregate: Annotation },
    Leaf { selected: bool, annotation: Annotation, url: String },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Segments joined with `/`, no leading slash. Empty for the root.
    pub path: String,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Selection state as seen by the parent's tri-state rule.
    pub fn tri_state(&self) -> TriState {
        match &self.kind {
            NodeKind::Directory { selection, .. } => *selection,
            NodeKind::Leaf { selected, .. } => TriState::from(*selected),
        }
    }

    pub fn is_selected_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { selected: true, .. })
    }

    /// Leaf annotation or directory aggregate.
    pub fn annotation(&self) -> Annotation {
        match &self.kind {
            NodeKind::Directory { aggregate, .. } => *aggregate,
            NodeKind::Leaf { annotation, .. } => *annotation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeModel {
    generation: Generation,
    nodes: Vec<Node>,
    by_path: HashMap<String, usize>,
}

impl TreeModel {
    /// A tree holding only the root directory.
    pub fn empty(generation: Generation) -> Self {
        let root = Node {
            name: String::new(),
            path: String::new(),
            depth: 0,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Directory {
                selection: TriState::Unselected,
                aggregate: Annotation::Value(0),
            },
        };
        Self { generation, nodes: vec![root], by_path: HashMap::new() }
    }

    /// Build a tree from a flat listing.
    ///
    /// Entries are ordered with [`compare_segments`] first; missing intermediate
    /// directories are created on the way down.
    pub fn build(entries: &[Entry], generation: Generation) -> Result<Self, BuildError> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut prepared = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let segments = split_segments(&entry.path);
            if segments.is_empty() {
                return Err(BuildError::EmptyPath { index });
            }
            let path = segments.join("/");
            if !seen.insert(path.clone()) {
                return Err(BuildError::DuplicatePath { path });
            }
            prepared.push((segments, entry));
        }

        prepared.sort_by(|(a, ea), (b, eb)| {
            compare_segments(a, ea.kind == EntryKind::Leaf, b, eb.kind == EntryKind::Leaf)
        });

        let mut tree = Self::empty(generation);
        for (segments, entry) in &prepared {
            tree.insert(segments, entry)?;
        }
        Ok(tree)
    }

    fn insert(&mut self, segments: &[String], entry: &Entry) -> Result<(), BuildError> {
        let mut current = ROOT;
        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            let path = segments[..=i].join("/");

            if let Some(&existing) = self.by_path.get(&path) {
                let terminal_leaf = is_last && entry.kind == EntryKind::Leaf;
                if self.nodes[existing].is_leaf() || terminal_leaf {
                    return Err(BuildError::PathConflict { path: segments.join("/"), existing: path });
                }
                current = existing;
                continue;
            }

            let kind = if is_last && entry.kind == EntryKind::Leaf {
                NodeKind::Leaf {
                    selected: false,
                    annotation: Annotation::Loading,
                    url: entry.url.clone(),
                }
            } else {
                NodeKind::Directory {
                    selection: TriState::Unselected,
                    aggregate: Annotation::Value(0),
                }
            };
            current = self.push(current, segment.clone(), path, kind);
        }
        Ok(())
    }

    fn push(&mut self, parent: usize, name: String, path: String, kind: NodeKind) -> usize {
        let index = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.by_path.insert(path.clone(), index);
        self.nodes.push(Node { name, path, depth, parent: Some(parent), children: Vec::new(), kind });
        self.nodes[parent].children.push(index);
        index
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn root(&self) -> NodeId {
        self.id(ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub(crate) fn id(&self, index: usize) -> NodeId {
        NodeId { generation: self.generation, index }
    }

    /// Map a handle to an arena index; `None` for handles of other generations.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<usize> {
        (id.generation == self.generation && id.index < self.nodes.len()).then_some(id.index)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.resolve(id).map(|index| &self.nodes[index])
    }

    /// Look a node up by its listing path (leading/trailing slashes ignored).
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let normalized = split_segments(path).join("/");
        if normalized.is_empty() {
            return Some(self.root());
        }
        self.by_path.get(&normalized).map(|&index| self.id(index))
    }

    pub(crate) fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    /// Directory chain from `index`'s parent up to and including the root.
    pub(crate) fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[index].parent, move |&i| self.nodes[i].parent)
    }

    /// `index` and everything below it, in pre-order (build order).
    pub(crate) fn subtree(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].children.iter().rev());
        }
        out
    }

    /// All leaves in build order.
    pub(crate) fn leaves(&self) -> Vec<usize> {
        self.subtree(ROOT).into_iter().filter(|&i| self.nodes[i].is_leaf()).collect()
    }

    /// Snapshot of a node's render-relevant state.
    pub(crate) fn change_for(&self, index: usize) -> NodeChange {
        let node = &self.nodes[index];
        match &node.kind {
            NodeKind::Directory { selection, aggregate } => NodeChange::Directory {
                node: self.id(index),
                selection: *selection,
                aggregate: *aggregate,
            },
            NodeKind::Leaf { selected, annotation, .. } => NodeChange::Leaf {
                node: self.id(index),
                selected: *selected,
                annotation: *annotation,
            },
        }
    }

    pub(crate) fn snapshot(&self, indices: &[usize]) -> Vec<(usize, NodeChange)> {
        indices.iter().map(|&i| (i, self.change_for(i))).collect()
    }

    /// Push a change for every snapshotted node whose state differs now.
    pub(crate) fn record_diffs(&self, before: Vec<(usize, NodeChange)>, changes: &mut Vec<NodeChange>) {
        for (index, old) in before {
            let current = self.change_for(index);
            if current != old {
                changes.push(current);
            }
        }
    }

    /// Child handles of a node, in build order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.resolve(id) {
            Some(index) => self.nodes[index].children.iter().map(|&c| self.id(c)).collect(),
            None => Vec::new(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.resolve(id).and_then(|index| self.nodes[index].parent).map(|p| self.id(p))
    }

    /// Handles of every leaf in build order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.leaves().into_iter().map(|index| self.id(index)).collect()
    }

    /// Handles of every directory except the root, in build order.
    pub fn directory_ids(&self) -> Vec<NodeId> {
        self.subtree(ROOT)
            .into_iter()
            .filter(|&i| i != ROOT && !self.nodes[i].is_leaf())
            .map(|index| self.id(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(path: &str) -> Entry {
        Entry::leaf(path, format!("url:{path}"))
    }

    fn names(tree: &TreeModel, id: NodeId) -> Vec<String> {
        tree.children(id).into_iter().map(|c| tree.get(c).expect("node").name.clone()).collect()
    }

    #[test]
    fn build_creates_intermediate_directories() {
        let tree = TreeModel::build(&[leaf("/a/b.js"), leaf("/a/c.py"), leaf("/d.txt")], Generation(1))
            .expect("build");

        assert_eq!(tree.len(), 5);
        assert_eq!(names(&tree, tree.root()), vec!["a", "d.txt"]);

        let dir = tree.find("a").expect("a");
        assert!(!tree.get(dir).expect("node").is_leaf());
        assert_eq!(names(&tree, dir), vec!["b.js", "c.py"]);

        let b = tree.find("/a/b.js").expect("b.js");
        assert_eq!(tree.parent(b), Some(dir));
        assert_eq!(tree.get(b).expect("node").annotation(), Annotation::Loading);
    }

    #[test]
    fn children_follow_ordering_policy() {
        let tree = TreeModel::build(
            &[leaf("z.md"), leaf("src/lib.rs"), leaf("A.md"), leaf("src/bin/x.rs")],
            Generation(1),
        )
        .expect("build");

        assert_eq!(names(&tree, tree.root()), vec!["src", "A.md", "z.md"]);
        let src = tree.find("src").expect("src");
        assert_eq!(names(&tree, src), vec!["bin", "lib.rs"]);
    }

    #[test]
    fn explicit_directory_entries_are_merged() {
        let entries = [leaf("a/b.rs"), Entry::directory("a"), Entry::directory("empty")];
        let tree = TreeModel::build(&entries, Generation(1)).expect("build");
        assert_eq!(tree.directory_ids().len(), 2);
        assert!(tree.children(tree.find("empty").expect("empty")).is_empty());
    }

    #[test]
    fn duplicate_path_fails_build() {
        let err = TreeModel::build(&[leaf("/a/b.js"), leaf("a/b.js")], Generation(1)).unwrap_err();
        assert_eq!(err, BuildError::DuplicatePath { path: "a/b.js".to_string() });
    }

    #[test]
    fn empty_path_fails_build() {
        let err = TreeModel::build(&[leaf("a.rs"), leaf("/")], Generation(1)).unwrap_err();
        assert_eq!(err, BuildError::EmptyPath { index: 1 });
    }

    #[test]
    fn path_through_file_fails_build() {
        let err = TreeModel::build(&[leaf("a"), leaf("a/b.rs")], Generation(1)).unwrap_err();
        assert!(matches!(err, BuildError::PathConflict { .. }));
    }

    #[test]
    fn handles_from_other_generation_do_not_resolve() {
        let old = TreeModel::build(&[leaf("a.rs")], Generation(1)).expect("build");
        let new = TreeModel::build(&[leaf("a.rs")], Generation(2)).expect("build");
        let stale = old.find("a.rs").expect("a.rs");
        assert!(new.get(stale).is_none());
        assert!(new.find("a.rs").is_some());
    }

    #[test]
    fn leaves_are_in_build_order() {
        let tree = TreeModel::build(&[leaf("b.rs"), leaf("a/z.rs"), leaf("a.rs")], Generation(1))
            .expect("build");
        let paths: Vec<&str> =
            tree.leaf_ids().into_iter().map(|id| tree.get(id).expect("leaf").path.as_str()).collect();
        assert_eq!(paths, vec!["a/z.rs", "a.rs", "b.rs"]);
    }
}
