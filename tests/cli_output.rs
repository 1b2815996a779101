//! CLI output contract
//!
//! - stdout carries exactly one JSON line per command, success or failure
//! - Log events go to stderr, whatever the log level
//! - Failures exit non-zero

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

fn write_config(dir: &TempDir, log_level: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    let config = json!({
        "data_dir": dir.path().join("data"),
        "log_level": log_level,
    });
    fs::write(&path, serde_json::to_vec(&config).unwrap()).unwrap();
    path
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rebac-store"))
        .args(args)
        .arg("--config")
        .arg(config)
        .output()
        .unwrap()
}

fn single_line(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {}", stdout);
    serde_json::from_str(lines[0]).unwrap()
}

#[test]
fn test_encode_prints_one_line_at_info() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "info");
    let args = [
        "encode",
        "--namespace",
        "docs",
        "--resource",
        "readme",
        "--relationship",
        "viewer",
    ];

    // First run allocates all three IDs and saves both files.
    let first = run(&config, &args);
    assert!(first.status.success());
    let response = single_line(&first);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["data"]["resource_id"], 1);

    let stderr = String::from_utf8(first.stderr).unwrap();
    assert!(stderr.contains("ID_MINTED"));
    assert!(stderr.contains("CONFIG_LOADED"));

    // Second run only looks the pair up.
    let again = run(&config, &args);
    assert!(again.status.success());
    assert_eq!(single_line(&again)["data"], response["data"]);
}

#[test]
fn test_trace_level_keeps_stdout_clean() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "trace");

    for expected in 1..=3u64 {
        let output = run(&config, &["tick", "jobs"]);
        assert!(output.status.success());
        assert_eq!(single_line(&output)["data"]["value"], expected);
    }
}

#[test]
fn test_failure_prints_one_error_line() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "info");

    let output = run(&config, &["decode", "12345"]);
    assert!(!output.status.success());

    let response = single_line(&output);
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "CLI_UNKNOWN_KEY");
}
