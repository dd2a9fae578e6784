//! Single-writer owner of one repository load.
//!
//! `Session` holds the current tree, its extension index, the generation
//! counter and the pending change notifications. Every mutation (load, toggle,
//! annotation result) runs synchronously to completion on the caller's thread;
//! asynchronous annotation results are fed in as messages through
//! [`Session::resolve_annotation`].

use crate::annotate::{recompute_aggregate, AnnotationAggregator, Resolution};
use crate::domain::{
    Annotation, AnnotationResult, Entry, ExtensionSummary, Generation, NodeChange, NodeId,
    SelectedLeaf,
};
use crate::select::{SelectionController, ToggleOutcome};
use crate::tree::{BuildError, ExtensionFilterIndex, NodeKind, TreeModel};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Session {
    tree: TreeModel,
    index: ExtensionFilterIndex,
    changes: Vec<NodeChange>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty session at generation 0.
    pub fn new() -> Self {
        let tree = TreeModel::empty(Generation::default());
        let index = ExtensionFilterIndex::build(&tree);
        Self { tree, index, changes: Vec::new() }
    }

    /// Replace the tree and index with ones built from `entries`.
    ///
    /// On success the generation is bumped, so results for the previous tree
    /// become stale. On failure the current tree is kept as is.
    pub fn load(&mut self, entries: &[Entry]) -> Result<Generation, BuildError> {
        let generation = self.tree.generation().next();
        let tree = TreeModel::build(entries, generation)?;
        let index = ExtensionFilterIndex::build(&tree);
        debug!(
            "loaded {} nodes ({} leaves, {} extensions) as {}",
            tree.len(),
            tree.leaf_ids().len(),
            index.all_extensions().len(),
            generation
        );
        self.tree = tree;
        self.index = index;
        self.changes.clear();
        Ok(generation)
    }

    pub fn generation(&self) -> Generation {
        self.tree.generation()
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn extensions(&self) -> &ExtensionFilterIndex {
        &self.index
    }

    fn controller(&mut self) -> SelectionController<'_> {
        SelectionController::new(&mut self.tree, &mut self.index, &mut self.changes)
    }

    pub fn toggle_leaf(&mut self, leaf: NodeId, checked: bool) -> ToggleOutcome {
        self.controller().toggle_leaf(leaf, checked)
    }

    pub fn toggle_directory(&mut self, dir: NodeId, checked: bool) -> ToggleOutcome {
        self.controller().toggle_directory(dir, checked)
    }

    pub fn toggle_extension(&mut self, ext: &str, checked: bool) -> ToggleOutcome {
        self.controller().toggle_extension(ext, checked)
    }

    /// Toggle whatever `node` is: a leaf, or a whole directory subtree.
    pub fn toggle(&mut self, node: NodeId, checked: bool) -> ToggleOutcome {
        match self.tree.get(node).map(|n| n.is_leaf()) {
            Some(true) => self.toggle_leaf(node, checked),
            Some(false) => self.toggle_directory(node, checked),
            None => {
                warn!("toggle: unknown node {:?}", node);
                ToggleOutcome::UnknownNode
            }
        }
    }

    /// Toggle a node addressed by its listing path.
    pub fn toggle_path(&mut self, path: &str, checked: bool) -> ToggleOutcome {
        match self.tree.find(path) {
            Some(node) => self.toggle(node, checked),
            None => {
                warn!("toggle: no node at path {:?}", path);
                ToggleOutcome::UnknownNode
            }
        }
    }

    pub fn resolve_annotation(
        &mut self,
        leaf: NodeId,
        generation: Generation,
        result: AnnotationResult,
    ) -> Resolution {
        AnnotationAggregator::new(&mut self.tree, &mut self.changes).resolve(leaf, generation, result)
    }

    /// Fresh aggregate of a directory; `None` for unknown handles and leaves.
    pub fn recompute_aggregate(&mut self, dir: NodeId) -> Option<Annotation> {
        let index = self.tree.resolve(dir).filter(|&i| !self.tree.node(i).is_leaf())?;
        AnnotationAggregator::new(&mut self.tree, &mut self.changes).recompute(&[index]);
        Some(recompute_aggregate(&self.tree, index))
    }

    /// Checked leaves in build order.
    pub fn selected_leaves(&self) -> Vec<SelectedLeaf> {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(|i| match &self.tree.node(i).kind {
                NodeKind::Leaf { selected: true, url, .. } => {
                    Some(SelectedLeaf { path: self.tree.node(i).path.clone(), url: url.clone() })
                }
                _ => None,
            })
            .collect()
    }

    pub fn extension_summaries(&self) -> BTreeMap<String, ExtensionSummary> {
        self.index.summaries()
    }

    /// Leaves whose annotation is still `Loading`, with their locators.
    pub fn pending_annotations(&self) -> Vec<(NodeId, String, String)> {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(|i| {
                let node = self.tree.node(i);
                match &node.kind {
                    NodeKind::Leaf { annotation: Annotation::Loading, url, .. } => {
                        Some((self.tree.id(i), node.path.clone(), url.clone()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Take the change notifications accumulated since the last call.
    pub fn drain_changes(&mut self) -> Vec<NodeChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TriState;

    fn entries(paths: &[&str]) -> Vec<Entry> {
        paths.iter().map(|p| Entry::leaf(*p, format!("blob:{p}"))).collect()
    }

    fn state(session: &Session, path: &str) -> TriState {
        let tree = session.tree();
        tree.get(tree.find(path).expect("path")).expect("node").tri_state()
    }

    fn annotation(session: &Session, path: &str) -> Annotation {
        let tree = session.tree();
        tree.get(tree.find(path).expect("path")).expect("node").annotation()
    }

    #[test]
    fn walkthrough_of_selection_and_annotation() {
        let mut session = Session::new();
        let generation = session.load(&entries(&["/a/b.js", "/a/c.py", "/d.txt"])).expect("load");
        let b = session.tree().find("a/b.js").expect("b");
        let c = session.tree().find("a/c.py").expect("c");

        assert_eq!(session.toggle_leaf(b, true), ToggleOutcome::Applied);
        assert_eq!(state(&session, "a"), TriState::Indeterminate);
        assert_eq!(state(&session, ""), TriState::Indeterminate);

        assert_eq!(session.toggle_leaf(c, true), ToggleOutcome::Applied);
        assert_eq!(state(&session, "a"), TriState::Selected);
        assert_eq!(state(&session, ""), TriState::Indeterminate);

        assert_eq!(
            session.resolve_annotation(b, generation, AnnotationResult::Value(10)),
            Resolution::Applied
        );
        assert_eq!(
            session.resolve_annotation(c, generation, AnnotationResult::Value(20)),
            Resolution::Applied
        );
        assert_eq!(annotation(&session, "a"), Annotation::Value(30));

        let selected: Vec<String> = session.selected_leaves().into_iter().map(|l| l.path).collect();
        assert_eq!(selected, vec!["a/b.js", "a/c.py"]);
        assert_eq!(session.selected_leaves()[0].url, "blob:/a/b.js");
    }

    #[test]
    fn stale_generation_after_rebuild_is_ignored() {
        let mut session = Session::new();
        let old = session.load(&entries(&["a.rs"])).expect("load");
        let old_leaf = session.tree().find("a.rs").expect("leaf");

        let new = session.load(&entries(&["a.rs"])).expect("reload");
        assert_ne!(old, new);

        assert_eq!(
            session.resolve_annotation(old_leaf, old, AnnotationResult::Value(5)),
            Resolution::Stale
        );
        assert_eq!(annotation(&session, "a.rs"), Annotation::Loading);

        assert_eq!(session.toggle_leaf(old_leaf, true), ToggleOutcome::UnknownNode);
        assert_eq!(state(&session, "a.rs"), TriState::Unselected);
    }

    #[test]
    fn failed_load_keeps_previous_tree() {
        let mut session = Session::new();
        let generation = session.load(&entries(&["a.rs"])).expect("load");
        let err = session.load(&entries(&["b.rs", "b.rs"])).unwrap_err();
        assert!(matches!(err, BuildError::DuplicatePath { .. }));
        assert_eq!(session.generation(), generation);
        assert!(session.tree().find("a.rs").is_some());
    }

    #[test]
    fn toggle_path_dispatches_on_kind() {
        let mut session = Session::new();
        session.load(&entries(&["src/a.rs", "src/b.rs", "README.md"])).expect("load");

        assert_eq!(session.toggle_path("src", true), ToggleOutcome::Applied);
        assert_eq!(session.selected_leaves().len(), 2);
        assert_eq!(session.toggle_path("/src/a.rs", false), ToggleOutcome::Applied);
        assert_eq!(state(&session, "src"), TriState::Indeterminate);
        assert_eq!(session.toggle_path("missing.rs", true), ToggleOutcome::UnknownNode);
    }

    #[test]
    fn extension_summaries_track_selection() {
        let mut session = Session::new();
        session.load(&entries(&["a.rs", "b/c.rs", "d.md"])).expect("load");
        assert_eq!(session.toggle_extension("rs", true), ToggleOutcome::Applied);

        let summaries = session.extension_summaries();
        assert_eq!(summaries["rs"], ExtensionSummary { state: TriState::Selected, count: 2 });
        assert_eq!(summaries["md"], ExtensionSummary { state: TriState::Unselected, count: 1 });
        assert_eq!(state(&session, "b"), TriState::Selected);
        assert_eq!(state(&session, ""), TriState::Indeterminate);
    }

    #[test]
    fn pending_annotations_shrink_as_results_arrive() {
        let mut session = Session::new();
        let generation = session.load(&entries(&["a.rs", "b.rs"])).expect("load");
        let pending = session.pending_annotations();
        assert_eq!(pending.len(), 2);

        let (leaf, path, _) = &pending[0];
        assert_eq!(path, "a.rs");
        assert_eq!(
            session.resolve_annotation(*leaf, generation, AnnotationResult::Error),
            Resolution::Applied
        );
        assert_eq!(session.pending_annotations().len(), 1);
    }

    #[test]
    fn drain_changes_empties_the_log() {
        let mut session = Session::new();
        session.load(&entries(&["a/b.rs"])).expect("load");
        assert_eq!(session.toggle_path("a/b.rs", true), ToggleOutcome::Applied);

        let changes = session.drain_changes();
        assert_eq!(changes.len(), 3);
        assert!(session.drain_changes().is_empty());
    }

    #[test]
    fn recompute_aggregate_is_stable() {
        let mut session = Session::new();
        let generation = session.load(&entries(&["a/b.rs"])).expect("load");
        let dir = session.tree().find("a").expect("a");
        let leaf = session.tree().find("a/b.rs").expect("leaf");
        assert_eq!(session.toggle_leaf(leaf, true), ToggleOutcome::Applied);
        let _ = session.resolve_annotation(leaf, generation, AnnotationResult::Value(9));
        session.drain_changes();

        assert_eq!(session.recompute_aggregate(dir), Some(Annotation::Value(9)));
        assert_eq!(session.recompute_aggregate(dir), Some(Annotation::Value(9)));
        assert!(session.drain_changes().is_empty());
        assert_eq!(session.recompute_aggregate(leaf), None);
    }
}
