//! Path normalization

use std::path::Path;

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// `path` relative to `root` as a forward-slash string, if it lives under `root`.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.to_str()?;
    let normalized = normalize_path(relative);
    (!normalized.is_empty()).then_some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_slash_path(root, Path::new("/repo/src/a.rs")), Some("src/a.rs".into()));
        assert_eq!(relative_slash_path(root, Path::new("/repo")), None);
        assert_eq!(relative_slash_path(root, Path::new("/other/a.rs")), None);
        assert_eq!(normalize_path(r"src\lib.rs"), "src/lib.rs");
    }
}
