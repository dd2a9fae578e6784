//! Prompt text export: a directory index followed by each file's content.

use crate::domain::FileContent;

#[derive(Debug, Default)]
struct IndexNode {
    name: String,
    children: Vec<IndexNode>,
}

impl IndexNode {
    fn insert(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let position = match self.children.iter().position(|c| c.name == *first) {
            Some(position) => position,
            None => {
                self.children.push(IndexNode { name: first.to_string(), children: Vec::new() });
                self.children.len() - 1
            }
        };
        self.children[position].insert(rest);
    }
}

fn build_index(node: &IndexNode, prefix: &str, out: &mut String) {
    let total = node.children.len();
    for (idx, child) in node.children.iter().enumerate() {
        let is_last = idx == total - 1;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(&format!("{prefix}{connector}{}\n", child.name));
        let extension = if is_last { "    " } else { "│   " };
        build_index(child, &format!("{prefix}{extension}"), out);
    }
}

/// Directory index of `paths`, rooted at `./`, children in first-seen order.
pub fn render_index<S: AsRef<str>>(paths: &[S]) -> String {
    let mut root = IndexNode { name: "./".to_string(), children: Vec::new() };
    for path in paths {
        let segments: Vec<&str> = path.as_ref().split('/').filter(|s| !s.is_empty()).collect();
        root.insert(&segments);
    }
    let wrapper = IndexNode { name: String::new(), children: vec![root] };
    let mut out = String::new();
    build_index(&wrapper, "", &mut out);
    out
}

/// Format selected file contents into one prompt-ready text.
pub fn format_repo_contents(contents: &[FileContent]) -> String {
    let paths: Vec<&str> = contents.iter().map(|c| c.path.as_str()).collect();
    let index = render_index(&paths);

    let mut text = String::new();
    for file in contents {
        text.push_str(&format!("\n\n---\nFile: /{}\n---\n\n{}\n", file.path, file.text));
    }

    format!("Directory Structure:\n\n{index}\n{text}")
}
