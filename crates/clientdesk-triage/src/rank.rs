use std::cmp::Ordering;

use clientdesk_core::model::Task;

/// Urgency order: earlier due date first, then higher priority.
///
/// Tasks without a due date sort after every dated task.
#[must_use]
pub fn compare_urgency(a: &Task, b: &Task) -> Ordering {
    let by_due = match (a.due_date, b.due_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_due.then_with(|| b.priority.rank().cmp(&a.priority.rank()))
}

/// Sorted copy of `tasks`. Ties keep their input order.
#[must_use]
pub fn urgency_rank(tasks: &[Task]) -> Vec<Task> {
    let mut ranked = tasks.to_vec();
    ranked.sort_by(compare_urgency);
    ranked
}
