//! Configuration loading and merging
//!
//! Precedence is CLI > config file > defaults.

pub mod loader;

pub use loader::load_config;

use crate::domain::{normalize_extension, Config};
use std::path::PathBuf;

/// Values given on the command line that replace the config file's.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub default_extensions: Option<Vec<String>>,
    pub exclude_globs: Option<Vec<String>>,
    pub no_gitignore: bool,
    pub max_file_bytes: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

pub fn merge_cli_with_config(mut config: Config, overrides: &CliOverrides) -> Config {
    if let Some(extensions) = &overrides.default_extensions {
        config.default_extensions = extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
    }
    if let Some(globs) = &overrides.exclude_globs {
        config.exclude_globs = globs.clone();
    }
    if overrides.no_gitignore {
        config.respect_gitignore = false;
    }
    if let Some(max) = overrides.max_file_bytes {
        config.max_file_bytes = max;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = Some(dir.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_replace_file_values() {
        let file = Config { max_file_bytes: 10, exclude_globs: vec!["dist".into()], ..Config::default() };
        let overrides = CliOverrides {
            default_extensions: Some(vec![".RS".into(), " ".into()]),
            no_gitignore: true,
            ..CliOverrides::default()
        };
        let merged = merge_cli_with_config(file, &overrides);
        assert_eq!(merged.default_extensions, vec!["rs"]);
        assert_eq!(merged.exclude_globs, vec!["dist"]);
        assert_eq!(merged.max_file_bytes, 10);
        assert!(!merged.respect_gitignore);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let merged = merge_cli_with_config(Config::default(), &CliOverrides::default());
        assert_eq!(merged, Config::default());
    }
}
