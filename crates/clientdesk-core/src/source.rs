//! Collaborator interfaces: the task data source and the bulk-import sink.
//!
//! The CRM's HTTP API sits behind these traits. [`MemorySource`] is an
//! in-process implementation with failure injection for tests and demos.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::model::{ClientRecord, Task, TaskFilter, TaskId, TaskStatus};

/// Errors reported by a task source or import sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure; the request may not have reached the server.
    #[error("task source unavailable: {0}")]
    Unavailable(String),

    /// The server answered and refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("task not found: {0}")]
    NotFound(TaskId),
}

impl SourceError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unavailable(_) => ErrorCode::SourceUnavailable,
            Self::Rejected(_) => ErrorCode::SourceRejected,
            Self::NotFound(_) => ErrorCode::TaskNotFound,
        }
    }
}

/// Server-side task list and status updates.
pub trait TaskSource {
    /// List tasks matching `filter`, in server order.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the source cannot be read.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, SourceError>;

    /// Persist a new status for one task.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the update is not applied.
    fn update_task_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<(), SourceError>;
}

/// Per-request counts returned by an import sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportCounts {
    pub imported: usize,
    pub failed: usize,
}

/// Receiver of validated client rows.
pub trait ImportSink {
    /// Import a batch of clients.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the whole request fails.
    fn import_clients(&mut self, clients: &[ClientRecord]) -> Result<ImportCounts, SourceError>;
}

/// In-memory task source and client store.
///
/// Failures queued with [`MemorySource::fail_next_update`] are returned by
/// the following status updates, oldest first.
#[derive(Debug, Default)]
pub struct MemorySource {
    tasks: Vec<Task>,
    clients: Vec<ClientRecord>,
    queued_failures: VecDeque<SourceError>,
    update_log: Vec<(TaskId, TaskStatus)>,
}

impl MemorySource {
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn fail_next_update(&mut self, error: SourceError) {
        self.queued_failures.push_back(error);
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    /// Every status update that reached the store, in call order.
    #[must_use]
    pub fn update_log(&self) -> &[(TaskId, TaskStatus)] {
        &self.update_log
    }

    pub fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| &t.id == id)?;
        Some(self.tasks.remove(pos))
    }
}

impl TaskSource for MemorySource {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, SourceError> {
        Ok(filter.apply(&self.tasks))
    }

    fn update_task_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<(), SourceError> {
        if let Some(err) = self.queued_failures.pop_front() {
            return Err(err);
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| SourceError::NotFound(id.clone()))?;
        task.status = status;
        self.update_log.push((id.clone(), status));
        Ok(())
    }
}

impl ImportSink for MemorySource {
    /// Clients whose email is already stored count as failed.
    fn import_clients(&mut self, clients: &[ClientRecord]) -> Result<ImportCounts, SourceError> {
        let mut known: HashSet<String> = self
            .clients
            .iter()
            .map(|c| c.email.to_ascii_lowercase())
            .collect();

        let mut counts = ImportCounts::default();
        for client in clients {
            if known.insert(client.email.to_ascii_lowercase()) {
                self.clients.push(client.clone());
                counts.imported += 1;
            } else {
                counts.failed += 1;
            }
        }
        Ok(counts)
    }
}
