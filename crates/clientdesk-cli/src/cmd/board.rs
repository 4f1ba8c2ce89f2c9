//! `cdesk board`: the task list laid out as kanban columns.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use clientdesk_core::board::Board;
use clientdesk_core::model::{Task, TaskFilter, TaskStatus};
use clientdesk_core::source::TaskSource;
use serde::Serialize;
use tracing::info;

use crate::cmd::{open_source, project_config};
use crate::output::{CliError, OutputMode, fail, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct BoardArgs {
    /// JSON task file.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct CardRow {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub due_date: Option<String>,
}

impl CardRow {
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            priority: task.priority.to_string(),
            due_date: task.due_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnRows {
    pub status: TaskStatus,
    pub cards: Vec<CardRow>,
}

/// Columns of `board` in display order.
pub fn column_rows(board: &Board) -> Vec<ColumnRows> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| ColumnRows {
            status,
            cards: board.column(status).into_iter().map(CardRow::new).collect(),
        })
        .collect()
}

pub fn run_board(args: &BoardArgs, output: OutputMode) -> anyhow::Result<()> {
    let config = project_config(output)?;
    let source = open_source(&args.file, output)?;
    let tasks = source
        .list_tasks(&TaskFilter::default())
        .map_err(|e| fail(output, &CliError::coded(e.code(), e.to_string())))?;
    info!(count = tasks.len(), "building board");

    let board = Board::with_config(tasks, &config.board);
    let columns = column_rows(&board);
    render_mode(
        output,
        &columns,
        |cols, w| render_board_text(cols, w),
        |cols, w| render_board_pretty(cols, w),
    )
}

fn render_board_text(columns: &[ColumnRows], w: &mut dyn Write) -> std::io::Result<()> {
    for column in columns {
        for card in &column.cards {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                column.status,
                card.id,
                card.priority,
                card.due_date.as_deref().unwrap_or("-"),
                card.title
            )?;
        }
    }
    Ok(())
}

fn render_board_pretty(columns: &[ColumnRows], w: &mut dyn Write) -> std::io::Result<()> {
    for column in columns {
        pretty_section(
            w,
            &format!("{} ({})", column.status.label(), column.cards.len()),
        )?;
        if column.cards.is_empty() {
            writeln!(w, "  (empty)")?;
        }
        for card in &column.cards {
            writeln!(
                w,
                "  {:<10} {:<6} {:<10} {}",
                card.id,
                card.priority,
                card.due_date.as_deref().unwrap_or("-"),
                card.title
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}
