//! repo2txt: select files from a repository and export them as prompt text
//!
//! The core is a checkbox tree over a flat repository listing: tri-state
//! directory selection, extension-wide toggles and token-count aggregates over
//! the selected files. Listing, content reads and rendering live around it.

pub mod annotate;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod render;
pub mod select;
pub mod session;
pub mod tree;
pub mod utils;

pub use domain::{
    Annotation, AnnotationResult, Config, Entry, EntryKind, ExtensionSummary, Generation,
    NodeChange, NodeId, SelectedLeaf, TriState,
};
pub use session::Session;
