#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::io;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "cdesk",
    author,
    version,
    about = "clientdesk: CRM tasks, kanban board, and client import",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output; shorthand for `--format json`.
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text, json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List tasks by urgency",
        long_about = "List tasks ranked by due date then priority, optionally grouped into overdue, today, upcoming, no due date, and completed.",
        after_help = "EXAMPLES:\n    # Ranked list\n    cdesk tasks -f tasks.json\n\n    # Open high-priority tasks, grouped\n    cdesk tasks -f tasks.json --status todo --priority high --group\n\n    # Pin the reference date\n    cdesk tasks -f tasks.json --group --today 2026-10-16 --json"
    )]
    Tasks(cmd::tasks::TasksArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the kanban board",
        long_about = "Lay tasks out in To Do, In Progress, and Closed columns.",
        after_help = "EXAMPLES:\n    # Show the board\n    cdesk board -f tasks.json\n\n    # Emit machine-readable output\n    cdesk board -f tasks.json --json"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Write",
        about = "Move a card to another column",
        long_about = "Drop a task on a column. A status change is written to the task file; a failed write rolls the card back and exits non-zero.",
        after_help = "EXAMPLES:\n    # Start work on a task\n    cdesk move t1 --to in_progress -f tasks.json\n\n    # Drop at the top of the column\n    cdesk move t1 --to closed --index 0 -f tasks.json"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Write",
        about = "Validate and import a client CSV",
        long_about = "Validate every row of a client CSV. With --into, valid rows are imported into a client JSON file; invalid rows are reported and skipped.",
        after_help = "EXAMPLES:\n    # Validate only\n    cdesk import clients.csv\n\n    # Import valid rows\n    cdesk import clients.csv --into clients.json\n\n    # Emit machine-readable output\n    cdesk import clients.csv --json"
    )]
    Import(cmd::import::ImportArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CLIENTDESK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "clientdesk=debug,cdesk=debug,info"
        } else {
            "clientdesk=info,cdesk=info,warn"
        })
    });

    let format = env::var("CLIENTDESK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    debug!(?output, "resolved output mode");

    match cli.command {
        Commands::Tasks(ref args) => cmd::tasks::run_tasks(args, output),
        Commands::Board(ref args) => cmd::board::run_board(args, output),
        Commands::Move(ref args) => cmd::move_cmd::run_move(args, output),
        Commands::Import(ref args) => cmd::import::run_import(args, output),
    }
}
