use std::fmt;

use chrono::NaiveDate;
use clientdesk_core::dates::{is_past, is_today};
use clientdesk_core::model::Task;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rank::urgency_rank;

/// Named due-date bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Overdue,
    Today,
    Upcoming,
    NoDueDate,
    Completed,
}

impl Bucket {
    /// Display order.
    pub const ALL: [Self; 5] = [
        Self::Overdue,
        Self::Today,
        Self::Upcoming,
        Self::NoDueDate,
        Self::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::NoDueDate => "no_due_date",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Upcoming => "Upcoming",
            Self::NoDueDate => "No due date",
            Self::Completed => "Completed",
        }
    }

    /// Bucket for one task. Checks run in a fixed order: completed status,
    /// missing due date, due today, past due, otherwise upcoming.
    #[must_use]
    pub fn classify(task: &Task, today: NaiveDate) -> Self {
        if task.status.is_done() {
            return Self::Completed;
        }
        match task.due_date {
            None => Self::NoDueDate,
            Some(due) if is_today(due, today) => Self::Today,
            Some(due) if is_past(due, today) => Self::Overdue,
            Some(_) => Self::Upcoming,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tasks partitioned by due-date bucket, input order kept within each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroups {
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub no_due_date: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskGroups {
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> &[Task] {
        match bucket {
            Bucket::Overdue => &self.overdue,
            Bucket::Today => &self.today,
            Bucket::Upcoming => &self.upcoming,
            Bucket::NoDueDate => &self.no_due_date,
            Bucket::Completed => &self.completed,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Task> {
        match bucket {
            Bucket::Overdue => &mut self.overdue,
            Bucket::Today => &mut self.today,
            Bucket::Upcoming => &mut self.upcoming,
            Bucket::NoDueDate => &mut self.no_due_date,
            Bucket::Completed => &mut self.completed,
        }
    }

    /// Buckets in display order, empty ones included.
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[Task])> + '_ {
        Bucket::ALL.into_iter().map(|bucket| (bucket, self.get(bucket)))
    }

    /// Same partition with each bucket sorted by urgency.
    #[must_use]
    pub fn ranked(&self) -> Self {
        let mut ranked = Self::default();
        for (bucket, tasks) in self.buckets() {
            *ranked.get_mut(bucket) = urgency_rank(tasks);
        }
        ranked
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets().map(|(_, tasks)| tasks.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `tasks` into the five due-date buckets relative to `today`.
#[must_use]
pub fn group_by_due_date(tasks: &[Task], today: NaiveDate) -> TaskGroups {
    let mut groups = TaskGroups::default();
    for task in tasks {
        groups
            .get_mut(Bucket::classify(task, today))
            .push(task.clone());
    }
    debug!(
        overdue = groups.overdue.len(),
        today = groups.today.len(),
        upcoming = groups.upcoming.len(),
        no_due_date = groups.no_due_date.len(),
        completed = groups.completed.len(),
        "grouped tasks by due date"
    );
    groups
}
