//! Output rendering (prompt text, ZIP archive, checkbox tree)

pub mod archive;
pub mod text;
pub mod tree;

pub use archive::write_archive;
pub use text::{format_repo_contents, render_index};
pub use tree::{render_extension_summary, render_tree};
