use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::StatusFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todos",
    version,
    about = "A keyboard-first todo list backed by a remote task store.",
    after_help = "Examples:\n  todos --user-id 42          Launch the TUI (same as `todos tui`)\n  todos list --filter active  Print active tasks and exit\n  TODOS_API_URL=http://localhost:3000 todos"
)]
pub struct Cli {
    /// Base URL of the task store (defaults to the public students API)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Numeric user id that owns the task list
    #[arg(long = "user-id", value_name = "ID", global = true)]
    pub user_id: Option<String>,

    /// Override the config directory holding config.json
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Tracing filter for the log file (e.g. "info", "todos_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the terminal UI (default command)
    Tui(TuiArgs),
    /// Print the task list and exit
    List(ListArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TuiArgs {
    /// Status filter selected on start-up
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub filter: StatusFilter,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only show tasks matching this status
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub filter: StatusFilter,
}
