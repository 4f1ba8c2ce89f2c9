use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::model::{Task, TaskId, TaskStatus};

/// Per-status ordered task lists.
///
/// Each column owns its own id order; moving a card never depends on how
/// other columns happen to be laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    order: BTreeMap<TaskStatus, Vec<TaskId>>,
    tasks: HashMap<TaskId, Task>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            order: TaskStatus::ALL
                .into_iter()
                .map(|status| (status, Vec::new()))
                .collect(),
            tasks: HashMap::new(),
        }
    }
}

impl Columns {
    /// Lay out tasks by status, keeping server order within each column.
    ///
    /// Repeated ids keep their first occurrence.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut columns = Self::default();
        for task in tasks {
            if columns.tasks.contains_key(&task.id) {
                warn!(task = %task.id, "duplicate task id in server list; keeping first");
                continue;
            }
            columns.insert(task.clone(), usize::MAX);
        }
        columns
    }

    #[must_use]
    pub fn ids(&self, status: TaskStatus) -> &[TaskId] {
        self.order.get(&status).map_or(&[][..], Vec::as_slice)
    }

    /// Tasks in one column, top to bottom.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.ids(status)
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Column and index of a task.
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<(TaskStatus, usize)> {
        let status = self.tasks.get(id)?.status;
        let index = self.ids(status).iter().position(|other| other == id)?;
        Some((status, index))
    }

    /// Take a task off the board, returning it with its former position.
    pub fn remove(&mut self, id: &TaskId) -> Option<(Task, TaskStatus, usize)> {
        let (status, index) = self.position(id)?;
        if let Some(ids) = self.order.get_mut(&status) {
            ids.remove(index);
        }
        let task = self.tasks.remove(id)?;
        Some((task, status, index))
    }

    /// Insert a task into the column named by its status.
    ///
    /// `index` is clamped to the column length; the landing index is returned.
    pub fn insert(&mut self, task: Task, index: usize) -> usize {
        let ids = self.order.entry(task.status).or_default();
        let index = index.min(ids.len());
        ids.insert(index, task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        index
    }

    /// Replace a task's fields in place, keeping its board status and slot.
    ///
    /// Returns false when the task is not on the board.
    pub fn refresh(&mut self, task: &Task) -> bool {
        let Some(current) = self.tasks.get_mut(&task.id) else {
            return false;
        };
        *current = task.with_status(current.status);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks, column by column in board order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        TaskStatus::ALL
            .iter()
            .flat_map(|status| self.column(*status))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(columns: &Columns, status: TaskStatus) -> Vec<&str> {
        columns.ids(status).iter().map(TaskId::as_str).collect()
    }

    #[test]
    fn layout_keeps_server_order_per_column() {
        let columns = Columns::from_tasks(&[
            Task::new("a", "a"),
            Task::new("b", "b").status(TaskStatus::Closed),
            Task::new("c", "c"),
            Task::new("d", "d").status(TaskStatus::InProgress),
        ]);
        assert_eq!(ids(&columns, TaskStatus::Todo), ["a", "c"]);
        assert_eq!(ids(&columns, TaskStatus::InProgress), ["d"]);
        assert_eq!(ids(&columns, TaskStatus::Closed), ["b"]);
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let columns = Columns::from_tasks(&[
            Task::new("a", "first"),
            Task::new("a", "second").status(TaskStatus::Closed),
        ]);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.get(&TaskId::from("a")).map(|t| t.title.as_str()), Some("first"));
        assert!(columns.ids(TaskStatus::Closed).is_empty());
    }

    #[test]
    fn remove_then_insert_restores_layout() {
        let original = Columns::from_tasks(&[
            Task::new("a", "a"),
            Task::new("b", "b"),
            Task::new("c", "c"),
        ]);
        let mut columns = original.clone();
        let (task, status, index) = columns.remove(&TaskId::from("b")).expect("present");
        assert_eq!((status, index), (TaskStatus::Todo, 1));
        assert_eq!(ids(&columns, TaskStatus::Todo), ["a", "c"]);

        columns.insert(task, index);
        assert_eq!(columns, original);
    }

    #[test]
    fn insert_clamps_to_column_end() {
        let mut columns = Columns::from_tasks(&[Task::new("a", "a")]);
        let landed = columns.insert(Task::new("z", "z"), 99);
        assert_eq!(landed, 1);
        assert_eq!(ids(&columns, TaskStatus::Todo), ["a", "z"]);
    }

    #[test]
    fn refresh_keeps_local_status() {
        let mut columns = Columns::from_tasks(&[Task::new("a", "old").status(TaskStatus::Closed)]);
        assert!(columns.refresh(&Task::new("a", "new")));
        let task = columns.get(&TaskId::from("a")).expect("present");
        assert_eq!(task.title, "new");
        assert_eq!(task.status, TaskStatus::Closed);
        assert!(!columns.refresh(&Task::new("missing", "x")));
    }
}
