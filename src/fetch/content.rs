//! Content readers resolving a leaf's `url` to its text.

use crate::domain::{FileContent, SelectedLeaf};
use crate::utils::{decode_text, looks_binary, DEFAULT_SAMPLE_SIZE};
use anyhow::{Context, Result};
use git2::{Oid, Repository};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where leaf locators point to. Cheap to clone and `Send`, unlike an open
/// repository handle; each worker opens its own [`ContentReader`].
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// `url` is a filesystem path.
    Filesystem { max_file_bytes: u64 },
    /// `url` is a blob id in the repository at `repo_path`.
    Git { repo_path: PathBuf, max_file_bytes: u64 },
}

impl ContentSource {
    pub fn open(&self) -> Result<ContentReader> {
        match self {
            ContentSource::Filesystem { max_file_bytes } => {
                Ok(ContentReader { repo: None, max_file_bytes: *max_file_bytes })
            }
            ContentSource::Git { repo_path, max_file_bytes } => {
                let repo = Repository::open(repo_path)
                    .with_context(|| format!("Failed opening repository {}", repo_path.display()))?;
                Ok(ContentReader { repo: Some(repo), max_file_bytes: *max_file_bytes })
            }
        }
    }
}

pub struct ContentReader {
    repo: Option<Repository>,
    max_file_bytes: u64,
}

impl ContentReader {
    /// Read and decode the text behind `url`.
    ///
    /// Fails for oversized and binary content.
    pub fn read(&self, url: &str) -> Result<String> {
        let bytes = match &self.repo {
            Some(repo) => self.read_blob(repo, url)?,
            None => self.read_file(Path::new(url))?,
        };
        if looks_binary(&bytes, DEFAULT_SAMPLE_SIZE) {
            anyhow::bail!("binary content");
        }
        Ok(decode_text(&bytes).0)
    }

    fn read_blob(&self, repo: &Repository, url: &str) -> Result<Vec<u8>> {
        let oid = Oid::from_str(url).with_context(|| format!("Invalid blob id: {url}"))?;
        let blob = repo.find_blob(oid).with_context(|| format!("Blob not found: {url}"))?;
        self.check_size(blob.size() as u64)?;
        if blob.is_binary() {
            anyhow::bail!("binary content");
        }
        Ok(blob.content().to_vec())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let metadata =
            path.metadata().with_context(|| format!("Failed to stat file: {}", path.display()))?;
        self.check_size(metadata.len())?;
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_bytes {
            anyhow::bail!("{} bytes exceeds max_file_bytes ({})", size, self.max_file_bytes);
        }
        Ok(())
    }
}

/// Read every selected leaf in parallel, preserving order.
///
/// Unreadable files are kept with an error text so exports stay complete.
pub fn read_all(source: &ContentSource, leaves: &[SelectedLeaf]) -> Vec<FileContent> {
    leaves
        .par_iter()
        .map_init(
            || source.open(),
            |reader, leaf| {
                let result = match reader {
                    Ok(reader) => reader.read(&leaf.url),
                    Err(e) => Err(anyhow::anyhow!("{e:#}")),
                };
                match result {
                    Ok(text) => FileContent { path: leaf.path.clone(), text, error: false },
                    Err(e) => {
                        warn!("Error fetching content for {}: {:#}", leaf.path, e);
                        FileContent {
                            path: leaf.path.clone(),
                            text: format!("Error fetching content: {e:#}"),
                            error: true,
                        }
                    }
                }
            },
        )
        .collect()
}
