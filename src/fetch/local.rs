//! Local directory listing

use crate::domain::{Config, Entry};
use crate::utils::relative_slash_path;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn validate_local_path(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !canonical.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    Ok(canonical)
}

fn build_exclude_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid exclude glob: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// List every file under `root` as a leaf entry whose `url` is its absolute path.
///
/// Honors `.gitignore` (when enabled) and `exclude_globs`; `.git` and other
/// hidden directories are skipped.
pub fn list_directory(root: &Path, config: &Config) -> Result<Vec<Entry>> {
    let exclude = build_exclude_globset(&config.exclude_globs)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .hidden(false)
        .parents(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_str().unwrap_or("");
            // Skip hidden directories except .github
            !(is_dir && entry.depth() > 0 && name.starts_with('.') && name != ".github")
        });

    let mut entries = Vec::new();
    for entry in builder.build().flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(rel_path) = relative_slash_path(root, entry.path()) else {
            continue;
        };
        if exclude.is_match(&rel_path) {
            debug!("excluded by glob: {}", rel_path);
            continue;
        }
        entries.push(Entry::leaf(rel_path, entry.path().to_string_lossy().into_owned()));
    }

    debug!("listed {} files under {}", entries.len(), root.display());
    Ok(entries)
}
