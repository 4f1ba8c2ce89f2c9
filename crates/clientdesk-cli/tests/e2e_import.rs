//! End-to-end checks for `cdesk import`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CLIENTS: &str = "\
name,email,phone,tags
Dana,dana@example.com,+1 555 0100,vip
Fox,not-an-email,,
Walter,walter@example.com,,lead
";

fn cdesk(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cdesk"));
    cmd.current_dir(dir);
    cmd.env("CLIENTDESK_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn setup(csv: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("clients.csv"), csv).expect("write csv");
    dir
}

fn write_config(dir: &Path, toml: &str) {
    fs::create_dir_all(dir.join(".clientdesk")).expect("mkdir");
    fs::write(dir.join(".clientdesk/config.toml"), toml).expect("write config");
}

fn import_json(dir: &Path, extra: &[&str]) -> Value {
    let output = cdesk(dir)
        .args(["import", "clients.csv", "--json"])
        .args(extra)
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "import failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

/// The rendered error is the first JSON value on stderr; `main` appends its own line.
fn stderr_json(stderr: &[u8]) -> Value {
    serde_json::Deserializer::from_slice(stderr)
        .into_iter::<Value>()
        .next()
        .expect("stderr should start with JSON")
        .expect("valid JSON")
}

fn error_code(output: &std::process::Output) -> String {
    let err = stderr_json(&output.stderr);
    err["error"]["error_code"]
        .as_str()
        .expect("error_code")
        .to_string()
}

#[test]
fn validation_reports_invalid_rows_without_failing() {
    let dir = setup(CLIENTS);
    let report = import_json(dir.path(), &[]);
    assert_eq!(report["rows"], 3);
    assert_eq!(report["valid"], 2);
    assert_eq!(report["invalid"], 1);
    assert_eq!(report["invalid_rows"][0]["line"], 3);
    assert_eq!(report["invalid_rows"][0]["name"], "Fox");
    assert!(report.get("summary").is_none());
    assert!(!dir.path().join("clients.json").exists());
}

#[test]
fn into_imports_only_valid_rows() {
    let dir = setup(CLIENTS);
    let report = import_json(dir.path(), &["--into", "clients.json"]);
    assert_eq!(report["summary"]["submitted"], 2);
    assert_eq!(report["summary"]["imported"], 2);
    assert_eq!(report["summary"]["skipped_invalid"], 1);

    let stored: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("clients.json")).expect("read"),
    )
    .expect("json");
    let emails: Vec<&str> = stored
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["email"].as_str().expect("email"))
        .collect();
    assert_eq!(emails, ["dana@example.com", "walter@example.com"]);
}

#[test]
fn reimport_counts_duplicates_as_failed() {
    let dir = setup(CLIENTS);
    import_json(dir.path(), &["--into", "clients.json"]);
    let report = import_json(dir.path(), &["--into", "clients.json"]);
    assert_eq!(report["summary"]["imported"], 0);
    assert_eq!(report["summary"]["failed"], 2);
}

#[test]
fn missing_email_column_fails_with_code() {
    let dir = setup("name,phone\nDana,555 0100\n");
    let output = cdesk(dir.path())
        .args(["import", "clients.csv", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    assert_eq!(error_code(&output), "E4002");
}

#[test]
fn row_cap_rejects_by_default() {
    let dir = setup(CLIENTS);
    write_config(dir.path(), "[import]\nmax_rows = 2\n");
    let output = cdesk(dir.path())
        .args(["import", "clients.csv", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    assert_eq!(error_code(&output), "E4003");
}

#[test]
fn row_cap_can_truncate() {
    let dir = setup(CLIENTS);
    write_config(
        dir.path(),
        "[import]\nmax_rows = 2\non_overflow = \"truncate\"\n",
    );
    let report = import_json(dir.path(), &[]);
    assert_eq!(report["rows"], 2);
    assert_eq!(report["truncated"], 1);
}

#[test]
fn broken_config_fails_with_code() {
    let dir = setup(CLIENTS);
    write_config(dir.path(), "[import\n");
    let output = cdesk(dir.path())
        .args(["import", "clients.csv", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    assert_eq!(error_code(&output), "E1002");
}

#[test]
fn text_output_summarizes_counts() {
    let dir = setup(CLIENTS);
    cdesk(dir.path())
        .args(["--format", "text", "import", "clients.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid\t3\tFox\t"))
        .stdout(predicate::str::contains("rows=3 valid=2 invalid=1 truncated=0"));
}

#[test]
fn latin1_row_is_reported_not_fatal() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("clients.csv"),
        b"name,email\nDana,dana@example.com\nJos\xe9,jose@example.com\n",
    )
    .expect("write csv");
    let report = import_json(dir.path(), &[]);
    assert_eq!(report["rows"], 2);
    assert_eq!(report["valid"], 1);
    assert_eq!(report["invalid_rows"][0]["line"], 3);
}
