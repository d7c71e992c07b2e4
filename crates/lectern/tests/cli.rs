//! CLI smoke tests.
//!
//! Drive the compiled `lectern` binary with the hash embedding provider
//! and the in-memory index, so no test touches the network or
//! downloads a model. The in-memory index holds no state between
//! invocations, so cross-command assertions stay within one process's
//! output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn lectern_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // test binary name
    path.pop(); // deps/
    path.push("lectern");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::write(
        root.join("notes.txt"),
        "Cats are mammals. Dogs are mammals too. Fish are not.",
    )
    .unwrap();

    let config_content = format!(
        r#"[index]
backend = "memory"
collection = "test_documents"

[embedding]
provider = "hash"
dims = 128

[chunking]
chunk_size = 20
overlap = 5

[history]
path = "{}/history.json"
max_messages = 10
"#,
        root.display()
    );

    let config_path = root.join("lectern.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_lectern(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = lectern_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run lectern binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn ingest_reports_stored_chunks() {
    let (tmp, config_path) = setup_test_env();
    let notes = tmp.path().join("notes.txt");

    let (stdout, stderr, success) =
        run_lectern(&config_path, &["ingest", notes.to_str().unwrap()]);
    assert!(success, "ingest failed: stdout={stdout}, stderr={stderr}");
    assert!(stdout.contains("ingest notes.txt"));
    assert!(stdout.contains("chunks stored:"));
    assert!(stdout.contains("ok"));
}

#[test]
fn ingest_missing_file_fails() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_lectern(&config_path, &["ingest", "/does/not/exist.txt"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read"));
}

#[test]
fn ask_with_no_documents_says_so() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_lectern(&config_path, &["ask", "What are mammals?"]);
    assert!(success);
    assert!(stdout.contains("couldn't find any relevant information"));
}

#[test]
fn documents_on_an_empty_index_lists_nothing() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_lectern(&config_path, &["documents"]);
    assert!(success);
    assert!(stdout.contains("documents (0)"));
    assert!(stdout.contains("ok"));
}

#[test]
fn stats_reports_the_collection() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_lectern(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("collection test_documents"));
    assert!(stdout.contains("points: 0"));
}

#[test]
fn invalid_chunking_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("lectern.toml");
    fs::write(
        &config_path,
        "[chunking]\nchunk_size = 100\noverlap = 100\n",
    )
    .unwrap();

    let (_, stderr, success) = run_lectern(&config_path, &["documents"]);
    assert!(!success);
    assert!(stderr.contains("overlap"));
}

#[test]
fn unknown_backend_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("lectern.toml");
    fs::write(&config_path, "[index]\nbackend = \"redis\"\n").unwrap();

    let (_, stderr, success) = run_lectern(&config_path, &["documents"]);
    assert!(!success);
    assert!(stderr.contains("Unknown index backend"));
}

#[test]
fn history_starts_empty_and_clears() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_lectern(&config_path, &["history"]);
    assert!(success);
    assert!(stdout.contains("history (0 messages)"));

    let (stdout, _, success) = run_lectern(&config_path, &["clear-history"]);
    assert!(success);
    assert!(stdout.contains("history cleared"));
}
