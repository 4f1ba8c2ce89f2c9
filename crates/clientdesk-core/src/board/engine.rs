use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::columns::Columns;
use super::membership;
use crate::config::BoardConfig;
use crate::model::{Task, TaskId, TaskStatus};
use crate::source::{SourceError, TaskSource};

/// Monotonic identifier of one optimistic move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveId(u64);

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "move-{}", self.0)
    }
}

/// Where a card was dropped.
///
/// `index` means "insert before the card currently shown at this position"
/// in the target column, counted before the dragged card is lifted out.
/// Anything past the end appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub status: TaskStatus,
    pub index: usize,
}

impl DropTarget {
    #[must_use]
    pub const fn new(status: TaskStatus, index: usize) -> Self {
        Self { status, index }
    }

    #[must_use]
    pub const fn end_of(status: TaskStatus) -> Self {
        Self {
            status,
            index: usize::MAX,
        }
    }
}

/// Receipt for an applied optimistic move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTicket {
    pub id: MoveId,
    pub task_id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
    /// Index the card landed on in its target column.
    pub index: usize,
    /// Only status changes go to the server; reorders are local.
    pub needs_persist: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Membership changed; columns were rebuilt from the server list.
    Rebuilt,
    /// Same ids; local order and status were kept.
    Kept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Confirmed,
    RolledBack,
    /// A newer status change on the same task owns the card now.
    Superseded,
    /// Already settled, never pending, or discarded by a rebuild.
    Unknown,
}

/// Result of [`Board::drag_end`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    pub ticket: MoveTicket,
    /// `None` for reorders within a column.
    pub settled: Option<SettleOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("task not found on board: {0}")]
    TaskNotFound(TaskId),
}

#[derive(Debug, Clone)]
struct PendingMove {
    task_id: TaskId,
    from_status: TaskStatus,
    from_index: usize,
    to: TaskStatus,
}

#[derive(Debug, Clone)]
struct Highlight {
    task_id: TaskId,
    until: Instant,
}

/// Optimistic kanban projection of the server task list.
#[derive(Debug, Clone)]
pub struct Board {
    columns: Columns,
    snapshot: Vec<Task>,
    membership: Vec<TaskId>,
    next_move: u64,
    pending: BTreeMap<MoveId, PendingMove>,
    latest_confirmed: HashMap<TaskId, MoveId>,
    highlight: Option<Highlight>,
    highlight_for: Duration,
}

impl Board {
    #[must_use]
    pub fn from_server(tasks: Vec<Task>) -> Self {
        Self::with_config(tasks, &BoardConfig::default())
    }

    #[must_use]
    pub fn with_config(tasks: Vec<Task>, config: &BoardConfig) -> Self {
        Self {
            columns: Columns::from_tasks(&tasks),
            membership: membership(&tasks),
            snapshot: tasks,
            next_move: 0,
            pending: BTreeMap::new(),
            latest_confirmed: HashMap::new(),
            highlight: None,
            highlight_for: config.highlight(),
        }
    }

    /// Fold in a fresh server list.
    ///
    /// Columns are rebuilt only when the id set changed. Otherwise the
    /// snapshot is replaced and task fields are refreshed in place, keeping
    /// each card's local status and position.
    pub fn sync(&mut self, tasks: Vec<Task>) -> SyncOutcome {
        let ids = membership(&tasks);
        if ids == self.membership {
            for task in &tasks {
                self.columns.refresh(task);
            }
            self.snapshot = tasks;
            debug!(tasks = self.snapshot.len(), "server refresh kept local board order");
            return SyncOutcome::Kept;
        }

        if !self.pending.is_empty() {
            debug!(
                discarded = self.pending.len(),
                "membership changed; dropping in-flight move bookkeeping"
            );
        }
        self.columns = Columns::from_tasks(&tasks);
        self.snapshot = tasks;
        self.membership = ids;
        self.pending.clear();
        self.latest_confirmed.clear();
        debug!(tasks = self.snapshot.len(), "board rebuilt from server list");
        SyncOutcome::Rebuilt
    }

    /// Apply a drop optimistically.
    ///
    /// Cross-column moves are recorded as pending until [`Board::settle`]
    /// is called with the server's answer.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] when the task is not on the board.
    pub fn begin_move(
        &mut self,
        task_id: &TaskId,
        target: DropTarget,
    ) -> Result<MoveTicket, BoardError> {
        let (task, from_status, from_index) = self
            .columns
            .remove(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.clone()))?;

        let same_column = from_status == target.status;
        let moved = if same_column {
            task
        } else {
            task.with_status(target.status)
        };

        // The lifted card no longer occupies its old slot.
        let mut index = target.index;
        if same_column && index > from_index {
            index -= 1;
        }
        let landed = self.columns.insert(moved, index);

        self.next_move += 1;
        let id = MoveId(self.next_move);
        let needs_persist = !same_column;
        if needs_persist {
            self.pending.insert(
                id,
                PendingMove {
                    task_id: task_id.clone(),
                    from_status,
                    from_index,
                    to: target.status,
                },
            );
        }

        self.highlight = Some(Highlight {
            task_id: task_id.clone(),
            until: Instant::now() + self.highlight_for,
        });

        debug!(
            move_id = %id,
            task = %task_id,
            from = %from_status,
            to = %target.status,
            index = landed,
            "applied optimistic move"
        );

        Ok(MoveTicket {
            id,
            task_id: task_id.clone(),
            from: from_status,
            to: target.status,
            index: landed,
            needs_persist,
        })
    }

    /// Record the server's answer for a pending move.
    pub fn settle(&mut self, move_id: MoveId, result: Result<(), SourceError>) -> SettleOutcome {
        let Some(pending) = self.pending.remove(&move_id) else {
            return SettleOutcome::Unknown;
        };

        match result {
            Ok(()) => {
                self.confirm(move_id, &pending);
                SettleOutcome::Confirmed
            }
            Err(err) => self.roll_back(move_id, pending, &err),
        }
    }

    /// Drop handler: apply the move, persist a status change, settle.
    ///
    /// Server failures never surface as errors; they roll the move back.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] when the task is not on the board.
    pub fn drag_end<S: TaskSource + ?Sized>(
        &mut self,
        source: &mut S,
        task_id: &TaskId,
        target: DropTarget,
    ) -> Result<DragOutcome, BoardError> {
        let ticket = self.begin_move(task_id, target)?;
        if !ticket.needs_persist {
            return Ok(DragOutcome {
                ticket,
                settled: None,
            });
        }

        let result = source.update_task_status(&ticket.task_id, ticket.to);
        let settled = self.settle(ticket.id, result);
        Ok(DragOutcome {
            ticket,
            settled: Some(settled),
        })
    }

    fn confirm(&mut self, move_id: MoveId, pending: &PendingMove) {
        let newer_confirmed = self
            .latest_confirmed
            .get(&pending.task_id)
            .is_some_and(|latest| *latest > move_id);
        if newer_confirmed {
            return;
        }

        self.latest_confirmed.insert(pending.task_id.clone(), move_id);
        if let Some(task) = self.snapshot.iter_mut().find(|t| t.id == pending.task_id) {
            task.status = pending.to;
        }
    }

    /// A failed move is superseded when a newer status change on the same
    /// task was confirmed or is still in flight. Only the newest surviving
    /// move actually reverts the card.
    fn roll_back(
        &mut self,
        move_id: MoveId,
        pending: PendingMove,
        err: &SourceError,
    ) -> SettleOutcome {
        let newer_confirmed = self
            .latest_confirmed
            .get(&pending.task_id)
            .is_some_and(|latest| *latest > move_id);
        if newer_confirmed {
            warn!(
                move_id = %move_id,
                task = %pending.task_id,
                error = %err,
                "status update failed after a newer move was confirmed"
            );
            return SettleOutcome::Superseded;
        }

        // The next pending move on this task started from our optimistic
        // state; point its rollback at the state we started from.
        let next = self
            .pending
            .range_mut(move_id..)
            .map(|(_, next)| next)
            .find(|next| next.task_id == pending.task_id);
        if let Some(next) = next {
            next.from_status = pending.from_status;
            next.from_index = pending.from_index;
            warn!(
                move_id = %move_id,
                task = %pending.task_id,
                error = %err,
                "status update failed; newer move on the same task takes over"
            );
            return SettleOutcome::Superseded;
        }

        if let Some((task, _, _)) = self.columns.remove(&pending.task_id) {
            self.columns
                .insert(task.with_status(pending.from_status), pending.from_index);
        }
        warn!(
            move_id = %move_id,
            task = %pending.task_id,
            error = %err,
            "status update failed; move rolled back"
        );
        SettleOutcome::RolledBack
    }

    /// Tasks in one column, top to bottom.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.columns.column(status)
    }

    #[must_use]
    pub const fn columns(&self) -> &Columns {
        &self.columns
    }

    /// All tasks as currently shown, column by column.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.columns.to_vec()
    }

    #[must_use]
    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        self.columns.get(task_id)
    }

    /// Last server list, with confirmed status changes applied.
    #[must_use]
    pub fn snapshot(&self) -> &[Task] {
        &self.snapshot
    }

    /// Sorted ids of the tasks the columns were last built from.
    #[must_use]
    pub fn membership(&self) -> &[TaskId] {
        &self.membership
    }

    #[must_use]
    pub fn pending_moves(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&TaskId> {
        self.highlighted_at(Instant::now())
    }

    /// The recently moved card, if its highlight has not expired by `now`.
    #[must_use]
    pub fn highlighted_at(&self, now: Instant) -> Option<&TaskId> {
        self.highlight
            .as_ref()
            .filter(|h| now < h.until)
            .map(|h| &h.task_id)
    }
}
