//! JSON-file collaborators standing in for the CRM's HTTP API.
//!
//! A task file is a JSON array of tasks; a client file is a JSON array of
//! client records. Both are rewritten in full after every change.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clientdesk_core::model::{ClientRecord, Priority, Task, TaskFilter, TaskId, TaskStatus};
use clientdesk_core::source::{ImportCounts, ImportSink, MemorySource, SourceError, TaskSource};
use clientdesk_core::dates::parse_due_date;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SourceError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| SourceError::Rejected(format!("cannot encode {}: {e}", path.display())))?;
    fs::write(path, body + "\n")
        .map_err(|e| SourceError::Unavailable(format!("cannot write {}: {e}", path.display())))
}

/// Typed checks on the fields serde would otherwise reject with a bare message.
///
/// The underlying `DateParseError` or `ParseEnumError` stays reachable
/// through `downcast_ref` so callers can attach its error code.
fn check_task_fields(value: &Value) -> anyhow::Result<()> {
    let id = value.get("id").and_then(Value::as_str).unwrap_or("?");
    for key in ["due_date", "dueDate"] {
        if let Some(raw) = value
            .get(key)
            .and_then(Value::as_str)
            .filter(|raw| !raw.trim().is_empty())
        {
            parse_due_date(raw).with_context(|| format!("task {id}: bad {key}"))?;
        }
    }
    if let Some(raw) = value.get("status").and_then(Value::as_str) {
        raw.parse::<TaskStatus>()
            .with_context(|| format!("task {id}: bad status"))?;
    }
    if let Some(raw) = value.get("priority").and_then(Value::as_str) {
        raw.parse::<Priority>()
            .with_context(|| format!("task {id}: bad priority"))?;
    }
    Ok(())
}

/// Task source backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    inner: MemorySource,
}

impl JsonFileSource {
    /// Read the task list at `path`.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file {}", path.display()))?;
        let values: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse task file {}", path.display()))?;
        for value in &values {
            check_task_fields(value)
                .with_context(|| format!("Invalid task in {}", path.display()))?;
        }
        let tasks: Vec<Task> = serde_json::from_value(Value::Array(values))
            .with_context(|| format!("Failed to parse task file {}", path.display()))?;
        debug!(path = %path.display(), tasks = tasks.len(), "loaded task file");
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemorySource::new(tasks),
        })
    }
}

impl TaskSource for JsonFileSource {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, SourceError> {
        self.inner.list_tasks(filter)
    }

    fn update_task_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<(), SourceError> {
        self.inner.update_task_status(id, status)?;
        write_json(&self.path, self.inner.tasks())
    }
}

/// Client store backed by a JSON file; a missing file starts empty.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    inner: MemorySource,
}

impl JsonFileSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let mut inner = MemorySource::default();
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read client file {}", path.display()))?;
            let existing: Vec<ClientRecord> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse client file {}", path.display()))?;
            inner
                .import_clients(&existing)
                .map_err(|e| anyhow::anyhow!("Failed to load client file: {e}"))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }
}

impl ImportSink for JsonFileSink {
    fn import_clients(&mut self, clients: &[ClientRecord]) -> Result<ImportCounts, SourceError> {
        let counts = self.inner.import_clients(clients)?;
        write_json(&self.path, self.inner.clients())?;
        Ok(counts)
    }
}
