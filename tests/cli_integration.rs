//! Integration tests for the `tk` CLI.
//!
//! Each test runs `tk --demo` as a subprocess against the built-in sample
//! board, with config and log file redirected into a temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Get the path to the built `tk` binary.
fn tk_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tk");
    path
}

fn setup(config: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), config).unwrap();
    tmp
}

/// Run `tk --demo` with the given args and return (stdout, stderr, success)
fn run_tk(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let config = dir.join("config.toml");
    let log = dir.join("tk.log");
    let output = Command::new(tk_bin())
        .arg("--demo")
        .arg("--config")
        .arg(&config)
        .arg("--log-file")
        .arg(&log)
        .args(args)
        .output()
        .expect("failed to run tk");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_tk_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, ok) = run_tk(dir, args);
    assert!(ok, "tk {:?} failed: {}", args, stderr);
    stdout
}

fn task_ids(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

#[test]
fn test_tasks_default_order() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["tasks"]);
    assert_eq!(
        task_ids(&stdout),
        vec!["T-101", "T-103", "T-201", "T-102", "T-104", "T-203", "T-202"]
    );
    assert!(stdout.contains("DOING"));
    assert!(stdout.contains("Add authentication flow  #auth"));
}

#[test]
fn test_tasks_status_filter() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["tasks", "--status", "todo"]);
    assert_eq!(task_ids(&stdout), vec!["T-201", "T-102", "T-104", "T-203"]);

    let stdout = run_tk_ok(tmp.path(), &["tasks", "--status", "review,done"]);
    assert_eq!(task_ids(&stdout), vec!["T-103", "T-202"]);
}

#[test]
fn test_tasks_project_and_feature() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["tasks", "--project", "p-api"]);
    assert_eq!(task_ids(&stdout), vec!["T-201", "T-203", "T-202"]);

    let stdout = run_tk_ok(tmp.path(), &["tasks", "--feature", "ui"]);
    assert_eq!(task_ids(&stdout), vec!["T-102", "T-104"]);
}

#[test]
fn test_tasks_sort_by_priority() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["tasks", "--sort", "priority"]);
    assert_eq!(
        task_ids(&stdout),
        vec!["T-101", "T-201", "T-103", "T-202", "T-102", "T-104", "T-203"]
    );
}

#[test]
fn test_tasks_json() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["tasks", "--json", "--project", "p-web"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let tasks = json.as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["id"], "T-101");
    assert_eq!(tasks[0]["status"], "doing");
    assert_eq!(tasks[0]["feature"], "auth");
}

#[test]
fn test_tasks_config_defaults_apply() {
    let tmp = setup("default_sort = \"alphabetical\"\ndefault_project = \"p-api\"\n");
    let stdout = run_tk_ok(tmp.path(), &["tasks"]);
    assert_eq!(task_ids(&stdout), vec!["T-201", "T-202", "T-203"]);
}

#[test]
fn test_tasks_bad_status_fails() {
    let tmp = setup("");
    let (_, stderr, ok) = run_tk(tmp.path(), &["tasks", "--status", "blocked"]);
    assert!(!ok);
    assert!(stderr.contains("unknown status 'blocked'"));
}

#[test]
fn test_bad_config_fails() {
    let tmp = setup("poll_interval_secs = \"often\"\n");
    let (_, stderr, ok) = run_tk(tmp.path(), &["tasks"]);
    assert!(!ok);
    assert!(stderr.contains("could not parse"));
}

// ---------------------------------------------------------------------------
// projects
// ---------------------------------------------------------------------------

#[test]
fn test_projects_list() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["projects"]);
    assert!(stdout.contains("p-web   Web client  (4 tasks)"));
    assert!(stdout.contains("p-api   API server  (3 tasks)"));
}

#[test]
fn test_projects_json() {
    let tmp = setup("");
    let stdout = run_tk_ok(tmp.path(), &["projects", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let projects = json.as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0]["id"], "p-web");
    assert_eq!(projects[0]["tasks"], 4);
}
