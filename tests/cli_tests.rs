//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tempfile::TempDir;

fn repo2txt() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repo2txt"))
}

/// `<tmp>/demo` with two default-extension files and a README.
fn demo_repo() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("tmp");
    let root = tmp.path().join("demo");
    fs::create_dir_all(root.join("src")).expect("mkdir");
    fs::write(root.join("src/app.py"), "print('hello')\n").expect("write app");
    fs::write(root.join("src/util.js"), "export const x = 1;\n").expect("write util");
    fs::write(root.join("README.md"), "# Demo\n").expect("write readme");
    (tmp, root)
}

#[test]
fn test_cli_version() {
    let mut cmd = repo2txt();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("repo2txt"));
}

#[test]
fn test_cli_help() {
    let mut cmd = repo2txt();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_export_requires_path_or_repo() {
    let mut cmd = repo2txt();
    cmd.arg("export");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Either --path or --repo must be specified"));
}

#[test]
fn test_export_rejects_both_path_and_repo() {
    let mut cmd = repo2txt();
    cmd.args(["export", "--path", ".", "--repo", "https://github.com/test/test"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot specify both --path and --repo"));
}

#[test]
fn test_export_rejects_non_github_url() {
    let mut cmd = repo2txt();
    cmd.args(["tree", "--repo", "https://gitlab.com/o/r"]);
    cmd.assert().failure().stderr(predicate::str::contains("github.com"));
}

#[test]
fn test_export_to_stdout_contains_default_selection() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["export", "--stdout", "--path"]).arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("Directory Structure:\n\n└── ./\n"))
        .stdout(predicate::str::contains("---\nFile: /src/app.py\n---\n\nprint('hello')\n"))
        .stdout(predicate::str::contains("File: /src/util.js"))
        .stdout(predicate::str::contains("README.md").not())
        .stderr(predicate::str::contains("Exported 2 files"));
}

#[test]
fn test_export_writes_default_file_name() {
    let (tmp, root) = demo_repo();
    let out = tmp.path().join("out");
    let mut cmd = repo2txt();
    cmd.args(["export", "--select", "README.md", "--path"]).arg(&root).arg("-o").arg(&out);
    cmd.assert().success().stdout(predicate::str::contains("Export complete!"));

    let written = fs::read_to_string(out.join("demo_prompt.txt")).expect("output file");
    assert!(written.contains("File: /README.md"));
    assert!(written.contains("File: /src/app.py"));
}

#[test]
fn test_export_zip_archives_selected_files() {
    let (tmp, root) = demo_repo();
    let out = tmp.path().join("out");
    let mut cmd = repo2txt();
    cmd.args(["export", "--zip", "--path"]).arg(&root).arg("-o").arg(&out);
    cmd.assert().success().stdout(predicate::str::contains("Files archived:  2"));

    let file = fs::File::open(out.join("demo.zip")).expect("archive");
    let mut archive = zip::ZipArchive::new(file).expect("zip");
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect();
    assert_eq!(names, ["src/app.py", "src/util.js"]);

    let mut text = String::new();
    archive.by_name("src/app.py").expect("app.py").read_to_string(&mut text).expect("read");
    assert_eq!(text, "print('hello')\n");
}

#[test]
fn test_export_zip_conflicts_with_stdout() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["export", "--zip", "--stdout", "--path"]).arg(&root);
    cmd.assert().failure().stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_export_fails_without_selection() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["export", "--stdout", "--no-default-selection", "--path"]).arg(&root);
    cmd.assert().failure().stderr(predicate::str::contains("No files selected"));
}

#[test]
fn test_select_unknown_path_fails() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["tree", "--select", "nope.rs", "--path"]).arg(&root);
    cmd.assert().failure().stderr(predicate::str::contains("Path not found in repository: nope.rs"));
}

#[test]
fn test_tree_shows_markers_and_tokens() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["tree", "--path"]).arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[-] demo/"))
        .stdout(predicate::str::contains("[x] src/ (tokens: 8)"))
        .stdout(predicate::str::contains("[x] app.py (tokens: 3)"))
        .stdout(predicate::str::contains("[ ] README.md (tokens: 1)"))
        .stdout(predicate::str::contains("Extensions:"))
        .stdout(predicate::str::contains("Selected: 2 files, ~8 tokens"));
}

#[test]
fn test_tree_exclude_ext_and_deselect() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["tree", "--no-tokens", "--exclude-ext", ".js", "--path"]).arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[-] src/"))
        .stdout(predicate::str::contains("[ ] util.js"));
}

#[test]
fn test_tree_json_output() {
    let (_tmp, root) = demo_repo();
    let mut cmd = repo2txt();
    cmd.args(["tree", "--json", "--include-ext", "md", "--path"]).arg(&root);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(report["name"], "demo");
    assert_eq!(report["selected"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["selected"][0]["path"], "README.md");
    assert_eq!(report["extensions"]["md"]["state"], "selected");
    assert_eq!(report["extensions"]["py"]["state"], "unselected");
}

#[test]
fn test_config_file_sets_default_extensions() {
    let (_tmp, root) = demo_repo();
    fs::write(root.join("repo2txt.toml"), "[repo2txt]\ndefault_extensions = 'md'\n")
        .expect("write config");
    let mut cmd = repo2txt();
    cmd.args(["export", "--stdout", "--path"]).arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("File: /README.md"))
        .stdout(predicate::str::contains("File: /src/app.py").not());
}

#[test]
fn test_explicit_bad_config_fails() {
    let (tmp, root) = demo_repo();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "max_file_bytes = 'lots'\n").expect("write config");
    let mut cmd = repo2txt();
    cmd.args(["tree", "--path"]).arg(&root).arg("--config").arg(&config);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid TOML config"));
}
