//! `cdesk tasks`: urgency-ranked task list, optionally grouped by due date.

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use clientdesk_core::dates::parse_due_date;
use clientdesk_core::model::{PriorityFilter, StatusFilter, Task, TaskFilter};
use clientdesk_core::source::TaskSource;
use clientdesk_triage::{Bucket, TaskDisplayInfo, group_by_due_date, urgency_rank};
use serde::Serialize;
use tracing::info;

use crate::cmd::{open_source, resolve_today};
use crate::output::{CliError, OutputMode, fail, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// JSON task file.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Filter by status: todo, in_progress, closed, all.
    #[arg(short, long, default_value = "all")]
    pub status: StatusFilter,

    /// Filter by priority: low, medium, high, all.
    #[arg(short, long, default_value = "all")]
    pub priority: PriorityFilter,

    /// Group into overdue / today / upcoming / no due date / completed.
    #[arg(short, long)]
    pub group: bool,

    /// Reference date (YYYY-MM-DD) instead of the local date.
    #[arg(long, value_parser = parse_due_date)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct TaskRow {
    id: String,
    title: String,
    status: String,
    priority: String,
    due_date: Option<String>,
    #[serde(flatten)]
    display: TaskDisplayInfo,
}

impl TaskRow {
    fn new(task: &Task, today: NaiveDate) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            due_date: task.due_date.map(|d| d.to_string()),
            display: TaskDisplayInfo::compute(task, today),
        }
    }

    fn when(&self) -> String {
        self.display
            .relative_label()
            .unwrap_or_else(|| "-".to_string())
    }
}

#[derive(Debug, Serialize)]
struct BucketRows {
    bucket: Bucket,
    tasks: Vec<TaskRow>,
}

pub fn run_tasks(args: &TasksArgs, output: OutputMode) -> anyhow::Result<()> {
    let source = open_source(&args.file, output)?;
    let filter = TaskFilter {
        status: args.status,
        priority: args.priority,
    };
    let tasks = source
        .list_tasks(&filter)
        .map_err(|e| fail(output, &CliError::coded(e.code(), e.to_string())))?;
    let today = resolve_today(args.today);
    info!(count = tasks.len(), %today, grouped = args.group, "listing tasks");

    if args.group {
        let groups = group_by_due_date(&tasks, today).ranked();
        let rows: Vec<BucketRows> = groups
            .buckets()
            .map(|(bucket, members)| BucketRows {
                bucket,
                tasks: members.iter().map(|t| TaskRow::new(t, today)).collect(),
            })
            .collect();
        return render_mode(
            output,
            &rows,
            |rows, w| render_groups_text(rows, w),
            |rows, w| render_groups_pretty(rows, w),
        );
    }

    let rows: Vec<TaskRow> = urgency_rank(&tasks)
        .iter()
        .map(|t| TaskRow::new(t, today))
        .collect();
    render_mode(
        output,
        &rows,
        |rows, w| render_rows_text(rows, w),
        |rows, w| render_rows_pretty(rows, w),
    )
}

fn write_row_text(w: &mut dyn Write, row: &TaskRow) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}\t{}",
        row.id,
        row.status,
        row.priority,
        row.due_date.as_deref().unwrap_or("-"),
        row.when(),
        row.title
    )
}

fn write_row_pretty(w: &mut dyn Write, row: &TaskRow) -> std::io::Result<()> {
    let marker = if row.display.is_overdue { "!" } else { " " };
    writeln!(
        w,
        "{marker} {:<10} {:<6} {:<12} {:<11} {}",
        row.id,
        row.priority,
        row.due_date.as_deref().unwrap_or("-"),
        row.when(),
        row.title
    )
}

fn render_rows_text(rows: &[TaskRow], w: &mut dyn Write) -> std::io::Result<()> {
    for row in rows {
        write_row_text(w, row)?;
    }
    Ok(())
}

fn render_rows_pretty(rows: &[TaskRow], w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Tasks ({})", rows.len()))?;
    if rows.is_empty() {
        writeln!(w, "  (no tasks)")?;
    }
    for row in rows {
        write_row_pretty(w, row)?;
    }
    Ok(())
}

fn render_groups_text(groups: &[BucketRows], w: &mut dyn Write) -> std::io::Result<()> {
    for group in groups {
        for row in &group.tasks {
            write!(w, "{}\t", group.bucket)?;
            write_row_text(w, row)?;
        }
    }
    Ok(())
}

fn render_groups_pretty(groups: &[BucketRows], w: &mut dyn Write) -> std::io::Result<()> {
    for group in groups.iter().filter(|g| !g.tasks.is_empty()) {
        pretty_section(
            w,
            &format!("{} ({})", group.bucket.label(), group.tasks.len()),
        )?;
        for row in &group.tasks {
            write_row_pretty(w, row)?;
        }
        writeln!(w)?;
    }
    if groups.iter().all(|g| g.tasks.is_empty()) {
        pretty_rule(w)?;
        writeln!(w, "  (no tasks)")?;
    }
    Ok(())
}
