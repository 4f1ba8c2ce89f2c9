//! `cdesk move`: drop a card on a column and persist the status change.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use clientdesk_core::board::{Board, BoardError, DropTarget, SettleOutcome};
use clientdesk_core::error::ErrorCode;
use clientdesk_core::model::{TaskFilter, TaskId, TaskStatus};
use clientdesk_core::source::TaskSource;
use serde::Serialize;
use tracing::info;

use crate::cmd::{open_source, project_config};
use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task ID to move.
    pub id: String,

    /// Target column: todo, in_progress, closed.
    #[arg(long)]
    pub to: TaskStatus,

    /// Drop position in the target column; defaults to the end.
    #[arg(long)]
    pub index: Option<usize>,

    /// JSON task file.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveResult {
    Confirmed,
    RolledBack,
    Superseded,
    /// Same column; nothing was sent to the task source.
    Reordered,
}

impl MoveResult {
    const fn from_settled(settled: Option<SettleOutcome>) -> Self {
        match settled {
            None => Self::Reordered,
            Some(SettleOutcome::Confirmed) => Self::Confirmed,
            Some(SettleOutcome::RolledBack) => Self::RolledBack,
            Some(SettleOutcome::Superseded | SettleOutcome::Unknown) => Self::Superseded,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::RolledBack => "rolled_back",
            Self::Superseded => "superseded",
            Self::Reordered => "reordered",
        }
    }
}

#[derive(Debug, Serialize)]
struct MoveReport {
    id: String,
    from: TaskStatus,
    to: TaskStatus,
    index: usize,
    persisted: bool,
    outcome: MoveResult,
    /// Where the card ended up after settling.
    column: TaskStatus,
    /// Ids in that column, top to bottom.
    column_ids: Vec<String>,
}

pub fn run_move(args: &MoveArgs, output: OutputMode) -> anyhow::Result<()> {
    let config = project_config(output)?;
    let mut source = open_source(&args.file, output)?;
    let tasks = source
        .list_tasks(&TaskFilter::default())
        .map_err(|e| fail(output, &CliError::coded(e.code(), e.to_string())))?;
    let mut board = Board::with_config(tasks, &config.board);

    let task_id = TaskId::from(args.id.as_str());
    let target = args
        .index
        .map_or(DropTarget::end_of(args.to), |index| DropTarget::new(args.to, index));
    let outcome = match board.drag_end(&mut source, &task_id, target) {
        Ok(outcome) => outcome,
        Err(BoardError::TaskNotFound(id)) => {
            return Err(fail(
                output,
                &CliError::coded(ErrorCode::TaskNotFound, format!("task not found: {id}")),
            ));
        }
    };

    let result = MoveResult::from_settled(outcome.settled);
    let column = board
        .get(&task_id)
        .map_or(outcome.ticket.to, |task| task.status);
    let report = MoveReport {
        id: task_id.to_string(),
        from: outcome.ticket.from,
        to: outcome.ticket.to,
        index: outcome.ticket.index,
        persisted: result == MoveResult::Confirmed,
        outcome: result,
        column,
        column_ids: board
            .column(column)
            .iter()
            .map(|t| t.id.to_string())
            .collect(),
    };
    info!(task = %task_id, outcome = result.as_str(), "move finished");

    render_mode(output, &report, render_move_text, render_move_pretty)?;
    if result == MoveResult::RolledBack {
        anyhow::bail!("status update for {task_id} failed; move rolled back");
    }
    Ok(())
}

fn render_move_text(report: &MoveReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        report.outcome.as_str(),
        report.id,
        report.from,
        report.column,
        report.index
    )
}

fn render_move_pretty(report: &MoveReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Move {}", report.id))?;
    pretty_kv(w, "from", report.from.label())?;
    pretty_kv(w, "to", report.to.label())?;
    pretty_kv(w, "position", (report.index + 1).to_string())?;
    pretty_kv(w, "outcome", report.outcome.as_str())?;
    if report.outcome == MoveResult::RolledBack {
        pretty_kv(w, "column", report.column.label())?;
    }
    pretty_kv(w, "order", report.column_ids.join(", "))
}
