//! CLI Integration Tests
//!
//! Tests the CLI binary directly using assert_cmd to exercise main.rs code paths.
//!
//! # Coverage Exclusion
//! These tests are skipped during coverage runs. Run without coverage for
//! full testing.

#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn docmerge() -> Command {
    let mut cmd = Command::cargo_bin("docmerge").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("DOCMERGE_SHEET")
        .env_remove("DOCMERGE_PREFIX")
        .env_remove("RUST_LOG");
    cmd
}

fn init_samples(dir: &Path) {
    docmerge().arg("init").arg(dir).assert().success();
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    docmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("docmerge"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    docmerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help_lists_options() {
    docmerge()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--prefix"))
        .stdout(predicate::str::contains("DOCMERGE_SHEET"));
}

#[test]
fn test_run_requires_arguments() {
    docmerge().arg("run").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// INIT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_init_creates_sample_files() {
    let dir = TempDir::new().unwrap();
    docmerge()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.xlsx"))
        .stdout(predicate::str::contains("template.docx"));

    assert!(dir.path().join("sample.xlsx").is_file());
    assert!(dir.path().join("template.docx").is_file());
}

#[test]
fn test_init_twice_needs_force() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("init")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    docmerge()
        .arg("init")
        .arg(dir.path())
        .arg("--force")
        .assert()
        .success();
}

// ═══════════════════════════════════════════════════════════════════════════
// RUN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_run_generates_documents() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());
    let out = dir.path().join("out");

    docmerge()
        .arg("run")
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .arg("--template")
        .arg(dir.path().join("template.docx"))
        .arg("--out")
        .arg(&out)
        .args(["--prefix", "Letter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully generated 3 document(s)!"));

    for name in ["1_Letter.docx", "2_Letter.docx", "3_Letter.docx"] {
        assert!(out.join(name).is_file(), "{} should exist", name);
    }
}

#[test]
fn test_run_prefix_from_environment() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());
    let out = dir.path().join("out");

    docmerge()
        .env("DOCMERGE_PREFIX", "Memo")
        .arg("run")
        .arg("-d")
        .arg(dir.path().join("sample.xlsx"))
        .arg("-t")
        .arg(dir.path().join("template.docx"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("1_Memo.docx").is_file());
}

#[test]
fn test_run_verbose_lists_files() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("--verbose")
        .arg("run")
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .arg("--template")
        .arg(dir.path().join("template.docx"))
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3_Output.docx"));
}

#[test]
fn test_run_wrong_sheet_fails() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("run")
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .args(["--sheet", "Budget"])
        .arg("--template")
        .arg(dir.path().join("template.docx"))
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Worksheet 'Budget' not found"));
}

#[test]
fn test_run_missing_spreadsheet_fails() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("run")
        .arg("--data")
        .arg(dir.path().join("missing.xlsx"))
        .arg("--template")
        .arg(dir.path().join("template.docx"))
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));

    assert!(!dir.path().join("out").join("1_Output.docx").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// PREVIEW AND BOOKMARKS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_table() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("preview")
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 field(s), 3 record(s)"))
        .stdout(predicate::str::contains("Evening"));
}

#[test]
fn test_preview_json() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    let output = docmerge()
        .arg("preview")
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fields"][1], "Name");
    assert_eq!(json["records"][0]["Name"], "Ming");
    assert_eq!(json["records"][2]["Budget"], "600");
}

#[test]
fn test_bookmarks_against_data() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());

    docmerge()
        .arg("bookmarks")
        .arg(dir.path().join("template.docx"))
        .arg("--data")
        .arg(dir.path().join("sample.xlsx"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget"))
        .stdout(predicate::str::contains("Filled: 3"));
}

#[test]
fn test_bookmarks_invalid_template_fails() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("broken.docx");
    std::fs::write(&template, "plain text").unwrap();

    docmerge().arg("bookmarks").arg(&template).assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// WIZARD TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_wizard_from_stdin() {
    let dir = TempDir::new().unwrap();
    init_samples(dir.path());
    let out = dir.path().join("wizard-out");

    let script = format!(
        "{}\n\n{}\n{}\nW\nn\n",
        dir.path().join("sample.xlsx").display(),
        dir.path().join("template.docx").display(),
        out.display()
    );

    docmerge()
        .arg("wizard")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully generated 3 document(s)!"));

    assert!(out.join("3_W.docx").is_file());
}

#[test]
fn test_wizard_closed_input_fails() {
    docmerge().arg("wizard").write_stdin("").assert().failure();
}
