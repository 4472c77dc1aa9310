//! CLI integration tests for taskgraph
//!
//! Every test points the binary at Taskfiles written into a temporary
//! directory and keeps the remote cache inside it as well.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CHAIN_TASKFILE: &str = r#"version: '3'
tasks:
  default:
    deps: [test]
  test:
    deps: [build]
  build:
    cmds:
      - go build
"#;

/// Get a command instance for the taskgraph binary
fn taskgraph_cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskgraph"));
    cmd.env("NO_COLOR", "1")
        .env_remove("TASKGRAPH_TASKFILE")
        .env_remove("TASKGRAPH_START")
        .env_remove("RUST_LOG")
        .arg("--temp-dir")
        .arg(temp.path().join("tmp"));
    cmd
}

fn write_taskfile(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_report_prints_every_section() {
    let dir = TempDir::new().unwrap();
    let taskfile = write_taskfile(dir.path(), "Taskfile.yml", CHAIN_TASKFILE);

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Taskfile Graph Analysis ==="))
        .stdout(predicate::str::contains("Version: 3.0.0\n"))
        .stdout(predicate::str::contains("=== Taskfile Inclusion Graph ==="))
        .stdout(predicate::str::contains("1. Taskfile: "))
        .stdout(predicate::str::contains("=== Task Dependencies ==="))
        .stdout(predicate::str::contains(
            "Task: build\n  Commands:\n    - cmd: go build\n",
        ))
        .stdout(predicate::str::contains(
            "=== Complete Dependency Tree from 'default' task ===\ndefault\n  test\n    build\n",
        ));
}

#[test]
fn test_report_lists_tasks_when_start_is_missing() {
    let dir = TempDir::new().unwrap();
    let taskfile = write_taskfile(
        dir.path(),
        "Taskfile.yml",
        "version: '3'\ntasks:\n  default:\n    cmds:\n      - echo hi\n",
    );

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .arg("--start")
        .arg("nonexistent")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Task 'nonexistent' not found\nAvailable tasks:\n  - default\n",
        ));
}

#[test]
fn test_start_task_from_environment() {
    let dir = TempDir::new().unwrap();
    let taskfile = write_taskfile(dir.path(), "Taskfile.yml", CHAIN_TASKFILE);

    taskgraph_cmd(&dir)
        .env("TASKGRAPH_TASKFILE", &taskfile)
        .env("TASKGRAPH_START", "test")
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("from 'test' task ===\ntest\n  build\n"));
}

// =============================================================================
// Subcommand Tests
// =============================================================================

#[test]
fn test_tree_with_explicit_task() {
    let dir = TempDir::new().unwrap();
    let taskfile = write_taskfile(dir.path(), "Taskfile.yml", CHAIN_TASKFILE);

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .arg("tree")
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("build\n"))
        .stdout(predicate::str::contains("test").not());
}

#[test]
fn test_tasks_lists_namespaced_includes() {
    let dir = TempDir::new().unwrap();
    write_taskfile(
        dir.path(),
        "docs/Taskfile.yml",
        "version: '3'\ntasks:\n  serve:\n    desc: Serve the docs\n    cmds:\n      - mkdocs serve\n",
    );
    let taskfile = write_taskfile(
        dir.path(),
        "Taskfile.yml",
        "version: '3'\nincludes:\n  docs: ./docs\ntasks:\n  default:\n    cmds:\n      - task: docs:serve\n",
    );

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: default\n  Commands:\n    - task: docs:serve\n"))
        .stdout(predicate::str::contains("Task: docs:serve - Serve the docs\n"))
        .stdout(predicate::str::contains("Complete Dependency Tree").not());
}

#[test]
fn test_includes_shows_topological_order() {
    let dir = TempDir::new().unwrap();
    write_taskfile(
        dir.path(),
        "docs/Taskfile.yml",
        "version: '3'\ntasks:\n  serve: mkdocs serve\n",
    );
    let taskfile = write_taskfile(
        dir.path(),
        "Taskfile.yml",
        "version: '3'\nincludes:\n  docs: ./docs\ntasks:\n  default: echo hi\n",
    );

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .arg("includes")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Taskfile: "))
        .stdout(predicate::str::contains("   Includes:\n     - docs: ./docs\n"))
        .stdout(predicate::str::contains("2. Taskfile: "));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_missing_taskfile_fails() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(dir.path().join("missing.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Failed to read Taskfile"));
}

#[test]
fn test_include_cycle_fails() {
    let dir = TempDir::new().unwrap();
    write_taskfile(
        dir.path(),
        "b.yml",
        "version: '3'\nincludes:\n  a: ./a.yml\ntasks:\n  b: echo b\n",
    );
    let taskfile = write_taskfile(
        dir.path(),
        "a.yml",
        "version: '3'\nincludes:\n  b: ./b.yml\ntasks:\n  a: echo a\n",
    );

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&taskfile)
        .assert()
        .failure()
        .stderr(predicate::str::contains("include cycle detected"));
}

#[test]
fn test_offline_remote_without_cache_fails() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("--offline")
        .arg("--taskfile")
        .arg("https://example.com/Taskfile.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline mode is enabled"));
}

#[test]
fn test_plain_http_requires_insecure() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg("http://example.com/Taskfile.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("plain HTTP"));
}

// =============================================================================
// Cache Tests
// =============================================================================

#[test]
fn test_cache_list_empty() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("cache")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached Taskfiles found."));
}

#[test]
fn test_cache_list_and_clear() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("tmp").join("taskgraph").join("remote");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(
        cache_dir.join("Taskfile.0123456789abcdef.yaml"),
        "version: '3'\n",
    )
    .unwrap();
    fs::write(cache_dir.join("Taskfile.0123456789abcdef.checksum"), "abc").unwrap();

    taskgraph_cmd(&dir)
        .arg("cache")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Taskfile.0123456789abcdef.yaml"))
        .stdout(predicate::str::contains(".checksum").not());

    taskgraph_cmd(&dir)
        .arg("cache")
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Taskfile cache cleared"));

    assert!(!cache_dir.exists());
}

#[test]
fn test_huge_cache_expiry_is_accepted() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("--cache-expiry-hours")
        .arg(u64::MAX.to_string())
        .arg("cache")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached Taskfiles found."));
}

// =============================================================================
// Remote Taskfile Tests
// =============================================================================

fn git(dir: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args([
            "-c",
            "user.name=taskgraph",
            "-c",
            "user.email=taskgraph@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_git_taskfile_is_prompted_and_cached() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    fs::create_dir_all(&source).unwrap();
    git(&source, &["init", "--quiet"]);
    fs::write(
        source.join("Taskfile.yml"),
        "version: '3'\ntasks:\n  remote:\n    cmds:\n      - echo remote\n",
    )
    .unwrap();
    git(&source, &["add", "Taskfile.yml"]);
    git(&source, &["commit", "--quiet", "-m", "add Taskfile"]);
    git(dir.path(), &["clone", "--quiet", "--bare", "source", "repo.git"]);

    let locator = format!("{}//Taskfile.yml", dir.path().join("repo.git").display());

    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&locator)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: remote\n"))
        .stderr(predicate::str::contains("PROMPT: "))
        .stderr(predicate::str::contains("Make sure you trust the source"));

    // A fresh cached copy is used without asking again
    taskgraph_cmd(&dir)
        .arg("--taskfile")
        .arg(&locator)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: remote\n"))
        .stderr(predicate::str::contains("PROMPT:").not());

    taskgraph_cmd(&dir)
        .arg("cache")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Taskfile."));
}
