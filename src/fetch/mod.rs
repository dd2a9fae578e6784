//! Repository listing collaborators (local directory, git tree, GitHub)

use crate::domain::{Config, Entry};
use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

pub mod content;
pub mod context;
pub mod git;
pub mod github;
pub mod local;

pub use content::{read_all, ContentReader, ContentSource};
pub use context::RepoContext;

/// A flat listing plus everything needed to read the listed files later.
pub struct Listing {
    pub entries: Vec<Entry>,
    pub content: ContentSource,
    /// Keeps temporary clones alive while content is still being read.
    pub context: RepoContext,
}

impl Listing {
    pub fn name(&self) -> &str {
        &self.context.name
    }
}

/// Produce a listing from a local path or a GitHub URL.
///
/// - Local path, no ref → directory walk, contents read from disk
/// - Local path with ref → git tree at that ref, contents read from blobs
/// - `github.com` URL → clone (with `token` if given), then git tree at the URL's (or explicit) ref
pub fn fetch_listing(
    path: Option<&Path>,
    repo_url: Option<&str>,
    ref_: Option<&str>,
    token: Option<&str>,
    config: &Config,
) -> Result<Listing> {
    let max_file_bytes = config.max_file_bytes;

    if let Some(p) = path {
        let root = local::validate_local_path(p)?;
        let context = RepoContext::local(root.clone());
        match ref_ {
            None => {
                let entries = local::list_directory(&root, config)?;
                Ok(Listing { entries, content: ContentSource::Filesystem { max_file_bytes }, context })
            }
            Some(reference) => {
                let repo = Repository::discover(&root)
                    .with_context(|| format!("Not a git repository: {}", root.display()))?;
                let repo_path = repo.path().to_path_buf();
                let entries = git::list_tree(&repo, reference, None)?;
                Ok(Listing { entries, content: ContentSource::Git { repo_path, max_file_bytes }, context })
            }
        }
    } else if let Some(url) = repo_url {
        if !github::is_github_url(url) {
            anyhow::bail!("Only https://github.com/ repository URLs are supported: {url}");
        }
        let (context, reference, subpath) = github::clone_repository(url, ref_, token)?;
        let repo = Repository::open(&context.root_path)?;
        let entries = git::list_tree(&repo, &reference, subpath.as_deref())?;
        let repo_path = repo.path().to_path_buf();
        Ok(Listing { entries, content: ContentSource::Git { repo_path, max_file_bytes }, context })
    } else {
        anyhow::bail!("Either path or repo_url must be specified")
    }
}
