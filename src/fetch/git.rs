//! Listing a git tree at a reference

use crate::domain::Entry;
use anyhow::{Context, Result};
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use std::path::Path;
use tracing::debug;

/// List every blob reachable from `reference` as a leaf entry whose `url` is
/// the blob id.
///
/// With `subpath`, listing starts at that directory of the tree and paths are
/// relative to it. Submodule entries are skipped.
pub fn list_tree(repo: &Repository, reference: &str, subpath: Option<&str>) -> Result<Vec<Entry>> {
    let object = resolve_reference(repo, reference)?;
    let mut tree = object
        .peel_to_tree()
        .with_context(|| format!("Reference {reference} does not point to a tree"))?;

    if let Some(sub) = subpath.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        let entry = tree
            .get_path(Path::new(sub))
            .with_context(|| format!("Path {sub} not found at {reference}"))?;
        tree = entry
            .to_object(repo)?
            .peel_to_tree()
            .with_context(|| format!("Path {sub} is not a directory at {reference}"))?;
    }

    let mut entries = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            if let Some(name) = entry.name() {
                entries.push(Entry::leaf(format!("{root}{name}"), entry.id().to_string()));
            }
        }
        TreeWalkResult::Ok
    })?;

    debug!("listed {} blobs at {}", entries.len(), reference);
    Ok(entries)
}

/// Resolve a branch, tag, or revision, falling back to the `origin/` remote
/// tracking branch of a fresh clone.
pub fn resolve_reference<'r>(repo: &'r Repository, reference: &str) -> Result<git2::Object<'r>> {
    repo.revparse_single(reference)
        .or_else(|_| repo.revparse_single(&format!("origin/{reference}")))
        .with_context(|| format!("Failed to resolve ref: {reference}"))
}
