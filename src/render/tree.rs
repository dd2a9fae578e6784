//! Checkbox tree view of a loaded session.

use crate::domain::{Annotation, ExtensionSummary, NodeId};
use crate::tree::{Node, NodeKind, TreeModel};
use crate::utils::format_with_commas;
use std::collections::BTreeMap;

/// Render the tree with selection markers and token annotations.
///
/// Directories deeper than `max_depth` are shown but not expanded.
pub fn render_tree(tree: &TreeModel, name: &str, max_depth: Option<usize>) -> String {
    let root = tree.root();
    let mut lines = Vec::new();
    if let Some(node) = tree.get(root) {
        lines.push(format!("{} {}/{}", node.tri_state().marker(), name, describe(node)));
    }
    walk_tree(tree, root, "", 1, max_depth, &mut lines);
    lines.join("\n")
}

fn walk_tree(
    tree: &TreeModel,
    id: NodeId,
    prefix: &str,
    depth: usize,
    max_depth: Option<usize>,
    lines: &mut Vec<String>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let children = tree.children(id);
    let total = children.len();
    for (idx, child) in children.into_iter().enumerate() {
        let Some(node) = tree.get(child) else { continue };
        let is_last = idx == total - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let slash = if node.is_leaf() { "" } else { "/" };

        lines.push(format!(
            "{}{}{} {}{}{}",
            prefix,
            connector,
            node.tri_state().marker(),
            node.name,
            slash,
            describe(node)
        ));

        if !node.is_leaf() {
            let extension = if is_last { "    " } else { "│   " };
            walk_tree(tree, child, &format!("{}{}", prefix, extension), depth + 1, max_depth, lines);
        }
    }
}

fn describe(node: &Node) -> String {
    match &node.kind {
        NodeKind::Directory { aggregate, .. } => match aggregate {
            Annotation::Loading => " (calculating...)".to_string(),
            Annotation::Error => " (contains errors)".to_string(),
            Annotation::Value(0) => String::new(),
            Annotation::Value(n) => format!(" (tokens: {})", format_with_commas(*n)),
        },
        NodeKind::Leaf { annotation, .. } => match annotation {
            Annotation::Loading => " (loading...)".to_string(),
            Annotation::Error => " (error)".to_string(),
            Annotation::Value(n) => format!(" (tokens: {})", format_with_commas(*n)),
        },
    }
}

/// One line per extension, most common first.
pub fn render_extension_summary(summaries: &BTreeMap<String, ExtensionSummary>) -> String {
    let mut ordered: Vec<(&String, &ExtensionSummary)> = summaries.iter().collect();
    ordered.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));

    let mut lines = vec!["Extensions:".to_string()];
    for (ext, summary) in ordered {
        let label = if ext.is_empty() { "(none)".to_string() } else { format!(".{ext}") };
        lines.push(format!("  {} {} ({})", summary.state.marker(), label, summary.count));
    }
    lines.join("\n")
}
