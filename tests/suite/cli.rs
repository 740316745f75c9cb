//! Runs the `logdiag` binary in one-shot mode.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

use crate::common::write_file;

const CONFIG: &str = r#"
[watch]
paths = ["*.log"]
presets = ["gcc"]
"#;

fn run_once(root: &Path, extra: &[&str]) -> Output {
    let config = root.join("config.toml");
    Command::new(env!("CARGO_BIN_EXE_logdiag"))
        .arg("--once")
        .arg("--config")
        .arg(&config)
        .arg("--root")
        .arg(root)
        .args(extra)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn once_reports_errors_with_failing_status() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "config.toml", CONFIG);
    write_file(dir.path(), "build.log", "main.c:4:2: error: expected ';'\n");

    let output = run_once(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = format!(
        "{}:4:2: error: [Build Log] expected ';'",
        dir.path().join("main.c").display()
    );
    assert!(stdout.contains(&expected), "stdout was: {stdout}");
    assert!(stdout.contains("E:1 W:0"));
}

#[test]
fn clean_run_writes_nothing_to_stderr() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "config.toml", CONFIG);
    write_file(dir.path(), "build.log", "main.c:4:2: warning: unused\n");

    let output = Command::new(env!("CARGO_BIN_EXE_logdiag"))
        .arg("--once")
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--root")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(
        output.stderr.is_empty(),
        "stderr was: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn once_with_only_warnings_succeeds() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "config.toml", CONFIG);
    write_file(dir.path(), "build.log", "main.c:4:2: warning: unused\n");

    let output = run_once(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn positional_paths_override_config() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "config.toml", CONFIG);
    write_file(dir.path(), "build.log", "main.c:4:2: error: ignored\n");
    write_file(dir.path(), "other.txt", "main.c:1:1: warning: picked\n");

    let output = run_once(dir.path(), &["other.txt"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("picked"));
    assert!(!stdout.contains("ignored"));
}

#[test]
fn once_without_patterns_exits_with_config_error() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "config.toml", "[watch]\npaths = [\"*.log\"]\n");

    let output = run_once(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no problem patterns configured"));
}
