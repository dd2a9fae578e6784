//! Core domain types shared by the tree model, selection and export layers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Extensions selected right after a repository load unless configured otherwise.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "py", "java", "cpp", "html", "css", "ts", "jsx", "tsx"];

/// Kind of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[serde(alias = "blob", alias = "file")]
    Leaf,
    #[serde(alias = "tree", alias = "dir")]
    Directory,
}

/// One item of a flat repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub kind: EntryKind,
    /// Locator understood by the content reader (filesystem path, blob id, ...).
    #[serde(default)]
    pub url: String,
}

impl Entry {
    pub fn leaf(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Leaf, url: url.into() }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Directory, url: String::new() }
    }
}

/// Counter bumped on every successful tree rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Stable handle of a node inside one generation of the tree.
///
/// Handles from a previous generation never resolve against a rebuilt tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    pub generation: Generation,
    pub index: usize,
}

/// Per-leaf annotation, and per-directory aggregate of those annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Annotation {
    #[default]
    Loading,
    Error,
    Value(u64),
}

impl Annotation {
    pub fn value(self) -> Option<u64> {
        match self {
            Annotation::Value(n) => Some(n),
            _ => None,
        }
    }
}

/// Outcome of an annotation fetch as delivered by the fetch collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationResult {
    Value(u64),
    Error,
}

impl From<AnnotationResult> for Annotation {
    fn from(result: AnnotationResult) -> Self {
        match result {
            AnnotationResult::Value(n) => Annotation::Value(n),
            AnnotationResult::Error => Annotation::Error,
        }
    }
}

impl<E> From<Result<u64, E>> for AnnotationResult {
    fn from(result: Result<u64, E>) -> Self {
        match result {
            Ok(n) => AnnotationResult::Value(n),
            Err(_) => AnnotationResult::Error,
        }
    }
}

/// Checkbox-style selection summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Unselected,
    Selected,
    Indeterminate,
}

impl TriState {
    pub fn marker(self) -> &'static str {
        match self {
            TriState::Unselected => "[ ]",
            TriState::Selected => "[x]",
            TriState::Indeterminate => "[-]",
        }
    }
}

impl From<bool> for TriState {
    fn from(selected: bool) -> Self {
        if selected {
            TriState::Selected
        } else {
            TriState::Unselected
        }
    }
}

/// Repaint notification for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeChange {
    Directory { node: NodeId, selection: TriState, aggregate: Annotation },
    Leaf { node: NodeId, selected: bool, annotation: Annotation },
}

impl NodeChange {
    pub fn node(&self) -> NodeId {
        match self {
            NodeChange::Directory { node, .. } | NodeChange::Leaf { node, .. } => *node,
        }
    }
}

/// A checked leaf as consumed by the export collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedLeaf {
    pub path: String,
    pub url: String,
}

/// Text of a selected file, ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub text: String,
    /// `text` holds an error description instead of the file's content.
    pub error: bool,
}

/// Derived selection state of one extension group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionSummary {
    pub state: TriState,
    pub count: usize,
}

/// User configuration loaded from `repo2txt.toml` / `.repo2txt.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_extensions")]
    pub default_extensions: Vec<String>,
    #[serde(deserialize_with = "deserialize_list")]
    pub exclude_globs: Vec<String>,
    pub respect_gitignore: bool,
    pub max_file_bytes: u64,
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_globs: Vec::new(),
            respect_gitignore: true,
            max_file_bytes: 1_048_576,
            output_dir: None,
        }
    }
}

/// Normalize a user-supplied extension (`".PY "` → `"py"`).
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_lowercase()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

impl StringOrList {
    fn into_items(self) -> Vec<String> {
        let raw = match self {
            StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
            StringOrList::List(items) => items,
        };
        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrList::deserialize(deserializer)?.into_items())
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = StringOrList::deserialize(deserializer)?.into_items();
    Ok(items.iter().map(|item| normalize_extension(item)).filter(|e| !e.is_empty()).collect())
}
