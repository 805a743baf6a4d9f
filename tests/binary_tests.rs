//! Integration tests for the sqint binary.

use std::{fs, io::Write};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::{NamedTempFile, tempdir};

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("sqint");
    cmd.env_remove("SQINT_DIALECT");
    cmd.env_remove("SQINT_MIN_CONFIDENCE");
    cmd
}

#[test]
fn test_check_clean_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELECT id FROM users WHERE id = ?\"").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s)"));
}

#[test]
fn test_check_reports_syntax_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELCT * FROM users\"").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "--no-color"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("SYN001"));
}

#[test]
fn test_injection_warning_passes_by_default() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELECT * FROM \" + table_name").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RISK001"));
}

#[test]
fn test_fail_on_warning() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELECT * FROM \" + table_name").unwrap();

    cmd()
        .args([
            "check",
            file.path().to_str().unwrap(),
            "--fail-on",
            "warning",
            "--no-color"
        ])
        .assert()
        .code(1);
}

#[test]
fn test_json_output() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELCT * FROM users\"").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "-f", "json", "--no-color"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"errors\""))
        .stdout(predicate::str::contains("\"SYN001\""));
}

#[test]
fn test_directory_scan_picks_up_python_files() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("app.py"),
        "query = \"SELCT * FROM users\"\n"
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "SELCT is not scanned here\n").unwrap();

    cmd()
        .args(["check", dir.path().to_str().unwrap(), "--no-color"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("app.py"))
        .stdout(predicate::str::contains("1 file(s) checked"));
}

#[test]
fn test_ignore_pragma_suppresses_findings() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELCT * FROM users\"  # sqint: ignore").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s)"));
}

#[test]
fn test_nonexistent_path_checks_nothing() {
    cmd()
        .args(["check", "/no/such/path/anywhere", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 file(s) checked"));
}

#[test]
fn test_dialect_flag() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELECT id FROM users LIMIT 10\"").unwrap();

    cmd()
        .args([
            "check",
            file.path().to_str().unwrap(),
            "--dialect",
            "postgres",
            "--no-color"
        ])
        .assert()
        .success();
}

#[test]
fn test_verbose_lists_clean_files() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "query = \"SELECT id FROM users\"").unwrap();

    cmd()
        .args(["check", file.path().to_str().unwrap(), "--verbose", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": ok"));
}
