//! Working-copy lifetime management

use std::path::PathBuf;

/// Where a listing's content lives on disk.
///
/// Temporary clones are removed when the context is dropped, so it must
/// outlive every content read.
pub struct RepoContext {
    pub root_path: PathBuf,
    /// Display name used for default output file names.
    pub name: String,
    pub is_temp: bool,
}

impl RepoContext {
    pub fn local(root_path: PathBuf) -> Self {
        let name = root_path.file_name().and_then(|n| n.to_str()).unwrap_or("repo").to_string();
        Self { root_path, name, is_temp: false }
    }

    pub fn temporary(root_path: PathBuf, name: impl Into<String>) -> Self {
        Self { root_path, name: name.into(), is_temp: true }
    }
}

impl Drop for RepoContext {
    fn drop(&mut self) {
        if self.is_temp {
            let _ = std::fs::remove_dir_all(&self.root_path);
        }
    }
}
