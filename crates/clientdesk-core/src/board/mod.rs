//! Kanban board engine.
//!
//! The board holds a client-side projection of the server's task list, one
//! ordered column per [`TaskStatus`](crate::model::TaskStatus). Drag-and-drop
//! moves are applied optimistically and confirmed or rolled back once the
//! server answers.
//!
//! # Reconciliation
//!
//! A server refresh replaces the columns only when the *set* of task ids
//! changes. Field updates on existing tasks are merged in without touching
//! local order or status, so an in-flight drag is never clobbered by a
//! background refetch.
//!
//! # Versioned rollback
//!
//! Every move gets a monotonic [`MoveId`]. A failed status update reverts
//! only its own move, and only when no newer status change on the same task
//! is still pending or already confirmed. A failed move with a pending
//! successor is dropped and the successor inherits its rollback target.

mod columns;
mod engine;

pub use columns::Columns;
pub use engine::{
    Board, BoardError, DragOutcome, DropTarget, MoveId, MoveTicket, SettleOutcome, SyncOutcome,
};

use crate::model::{Task, TaskId};

/// Sorted, de-duplicated task ids: the board's membership key.
#[must_use]
pub fn membership(tasks: &[Task]) -> Vec<TaskId> {
    let mut ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
