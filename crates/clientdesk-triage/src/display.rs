use chrono::NaiveDate;
use clientdesk_core::dates::{days_until, is_past, is_today, is_tomorrow};
use clientdesk_core::model::Task;
use serde::Serialize;

/// Derived due-date flags for rendering one task.
///
/// Recomputed per render from the task and the current date; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskDisplayInfo {
    /// Not closed and due strictly before today.
    pub is_overdue: bool,
    pub is_due_today: bool,
    pub is_due_tomorrow: bool,
    /// Negative for past dates; `None` without a due date.
    pub days_until_due: Option<i64>,
}

impl TaskDisplayInfo {
    #[must_use]
    pub fn compute(task: &Task, today: NaiveDate) -> Self {
        let Some(due) = task.due_date else {
            return Self::default();
        };
        Self {
            is_overdue: !task.status.is_done() && is_past(due, today),
            is_due_today: is_today(due, today),
            is_due_tomorrow: is_tomorrow(due, today),
            days_until_due: Some(days_until(due, today)),
        }
    }

    /// Short human label: "overdue 2d", "today", "tomorrow", "in 5d".
    #[must_use]
    pub fn relative_label(&self) -> Option<String> {
        let days = self.days_until_due?;
        Some(match days {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            d if d < 0 && self.is_overdue => format!("overdue {}d", -d),
            d if d < 0 => format!("{}d ago", -d),
            d => format!("in {d}d"),
        })
    }
}
