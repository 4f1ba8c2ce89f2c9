//! End-to-end checks for `cdesk tasks`, `cdesk board`, and `cdesk move`.
//!
//! Each test runs the binary in its own temp directory against a JSON task file.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const TASKS: &str = r#"[
  {"id": "t1", "title": "Renewal", "due_date": "2026-10-14", "priority": "high", "status": "todo"},
  {"id": "t2", "title": "Call back", "due_date": "2026-10-16", "status": "todo"},
  {"id": "t3", "title": "Send quote", "due_date": "2026-10-19", "priority": "high", "status": "in_progress"},
  {"id": "t4", "title": "Newsletter", "priority": "low", "status": "todo"},
  {"id": "t5", "title": "Old invoice", "due_date": "2026-10-06", "status": "closed"}
]"#;

fn cdesk(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cdesk"));
    cmd.current_dir(dir);
    cmd.env("CLIENTDESK_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("tasks.json"), TASKS).expect("write tasks");
    dir
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cdesk(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn ids(rows: &Value) -> Vec<String> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|r| r["id"].as_str().expect("id").to_string())
        .collect()
}

/// The rendered error is the first JSON value on stderr; `main` appends its own line.
fn stderr_json(stderr: &[u8]) -> Value {
    serde_json::Deserializer::from_slice(stderr)
        .into_iter::<Value>()
        .next()
        .expect("stderr should start with JSON")
        .expect("valid JSON")
}

fn stored_status(dir: &Path, id: &str) -> String {
    let tasks: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("tasks.json")).expect("read"))
            .expect("json");
    tasks
        .as_array()
        .expect("array")
        .iter()
        .find(|t| t["id"] == id)
        .and_then(|t| t["status"].as_str())
        .expect("status")
        .to_string()
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

#[test]
fn tasks_are_ranked_by_due_date_then_priority() {
    let dir = setup();
    let rows = run_json(
        dir.path(),
        &["tasks", "-f", "tasks.json", "--today", "2026-10-16"],
    );
    assert_eq!(ids(&rows), ["t5", "t1", "t2", "t3", "t4"]);
    assert_eq!(rows[1]["is_overdue"], true);
    assert_eq!(rows[2]["is_due_today"], true);
    assert_eq!(rows[3]["days_until_due"], 3);
    assert!(rows[4]["due_date"].is_null());
}

#[test]
fn grouped_tasks_fall_into_buckets() {
    let dir = setup();
    let groups = run_json(
        dir.path(),
        &["tasks", "-f", "tasks.json", "--group", "--today", "2026-10-16"],
    );
    let groups = groups.as_array().expect("array");
    let buckets: Vec<&str> = groups
        .iter()
        .map(|g| g["bucket"].as_str().expect("bucket"))
        .collect();
    assert_eq!(
        buckets,
        ["overdue", "today", "upcoming", "no_due_date", "completed"]
    );
    assert_eq!(ids(&groups[0]["tasks"]), ["t1"]);
    assert_eq!(ids(&groups[1]["tasks"]), ["t2"]);
    assert_eq!(ids(&groups[2]["tasks"]), ["t3"]);
    assert_eq!(ids(&groups[3]["tasks"]), ["t4"]);
    assert_eq!(ids(&groups[4]["tasks"]), ["t5"]);
}

#[test]
fn tasks_filter_by_status_and_priority() {
    let dir = setup();
    let rows = run_json(
        dir.path(),
        &["tasks", "-f", "tasks.json", "--status", "todo", "--priority", "high"],
    );
    assert_eq!(ids(&rows), ["t1"]);
}

#[test]
fn tasks_text_output_is_tab_separated() {
    let dir = setup();
    cdesk(dir.path())
        .args([
            "--format", "text", "tasks", "-f", "tasks.json", "--today", "2026-10-16",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("t5\tclosed\tmedium\t2026-10-06\t"));
}

#[test]
fn missing_task_file_reports_code() {
    let dir = TempDir::new().expect("tempdir");
    cdesk(dir.path())
        .args(["tasks", "-f", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1003"));
}

#[test]
fn bad_today_flag_is_a_usage_error() {
    let dir = setup();
    cdesk(dir.path())
        .args(["tasks", "-f", "tasks.json", "--today", "tomorrow"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// board / move
// ---------------------------------------------------------------------------

#[test]
fn board_lays_tasks_out_in_three_columns() {
    let dir = setup();
    let columns = run_json(dir.path(), &["board", "-f", "tasks.json"]);
    let columns = columns.as_array().expect("array");
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0]["status"], "todo");
    assert_eq!(ids(&columns[0]["cards"]), ["t1", "t2", "t4"]);
    assert_eq!(ids(&columns[1]["cards"]), ["t3"]);
    assert_eq!(ids(&columns[2]["cards"]), ["t5"]);
}

#[test]
fn board_pretty_output_has_column_headings() {
    let dir = setup();
    cdesk(dir.path())
        .args(["--format", "pretty", "board", "-f", "tasks.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do (3)"))
        .stdout(predicate::str::contains("In Progress (1)"))
        .stdout(predicate::str::contains("Closed (1)"));
}

#[test]
fn move_to_other_column_is_persisted() {
    let dir = setup();
    let report = run_json(dir.path(), &["move", "t1", "--to", "closed", "-f", "tasks.json"]);
    assert_eq!(report["outcome"], "confirmed");
    assert_eq!(report["persisted"], true);
    assert_eq!(report["from"], "todo");
    assert_eq!(report["column"], "closed");
    assert_eq!(report["column_ids"], serde_json::json!(["t5", "t1"]));
    assert_eq!(stored_status(dir.path(), "t1"), "closed");

    let columns = run_json(dir.path(), &["board", "-f", "tasks.json"]);
    assert_eq!(ids(&columns[0]["cards"]), ["t2", "t4"]);
}

#[test]
fn move_to_top_of_other_column() {
    let dir = setup();
    let report = run_json(
        dir.path(),
        &["move", "t2", "--to", "in_progress", "--index", "0", "-f", "tasks.json"],
    );
    assert_eq!(report["index"], 0);
    assert_eq!(report["column_ids"], serde_json::json!(["t2", "t3"]));
    assert_eq!(stored_status(dir.path(), "t2"), "in_progress");
}

#[test]
fn reorder_within_column_is_not_persisted() {
    let dir = setup();
    let before = fs::read_to_string(dir.path().join("tasks.json")).expect("read");
    let report = run_json(
        dir.path(),
        &["move", "t4", "--to", "todo", "--index", "0", "-f", "tasks.json"],
    );
    assert_eq!(report["outcome"], "reordered");
    assert_eq!(report["persisted"], false);
    assert_eq!(report["column_ids"], serde_json::json!(["t4", "t1", "t2"]));
    let after = fs::read_to_string(dir.path().join("tasks.json")).expect("read");
    assert_eq!(before, after);
}

#[test]
fn move_unknown_task_fails_with_code() {
    let dir = setup();
    let output = cdesk(dir.path())
        .args(["move", "nope", "--to", "closed", "-f", "tasks.json", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    let err = stderr_json(&output.stderr);
    assert_eq!(err["error"]["error_code"], "E2001");
}

#[test]
fn malformed_due_date_in_task_file_reports_code() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("tasks.json"),
        r#"[{"id": "t1", "title": "Renewal", "due_date": "14/10/2026"}]"#,
    )
    .expect("write tasks");
    let output = cdesk(dir.path())
        .args(["board", "-f", "tasks.json", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    let err = stderr_json(&output.stderr);
    assert_eq!(err["error"]["error_code"], "E2006");
}

#[test]
fn unknown_status_in_task_file_reports_code() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("tasks.json"),
        r#"[{"id": "t1", "title": "Renewal", "status": "blocked"}]"#,
    )
    .expect("write tasks");
    let output = cdesk(dir.path())
        .args(["tasks", "-f", "tasks.json", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    let err = stderr_json(&output.stderr);
    assert_eq!(err["error"]["error_code"], "E2005");
}
