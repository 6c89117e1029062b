use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::cli::ListArgs;
use crate::config::AppConfig;
use crate::core::{ErrorKind, HttpTransport, TaskListController, TodoState};
use crate::model::{StatusFilter, TaskId};

/// Load the task list once and print it to `writer`.
pub fn list<W: Write>(config: &AppConfig, args: &ListArgs, writer: W) -> Result<()> {
    let user_id = config.require_user_id()?;
    let transport = HttpTransport::from_config(config)?;
    let controller = TaskListController::new(Arc::new(transport), user_id);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(list_tasks(&controller, args.filter, writer))
        .with_context(|| format!("listing tasks from {}", config.api_url()))
}

async fn list_tasks<W: Write>(
    controller: &TaskListController,
    filter: StatusFilter,
    mut writer: W,
) -> Result<()> {
    if !controller.load().await {
        return Err(anyhow!(ErrorKind::LoadFailed.message()));
    }
    controller.set_filter(filter);
    let listing = controller.with_state(Listing::from_state);
    listing.write_to(&mut writer)
}

struct ListedTask {
    id: TaskId,
    title: String,
    completed: bool,
}

struct Listing {
    tasks: Vec<ListedTask>,
    remaining: usize,
    total: usize,
}

impl Listing {
    fn from_state(state: &TodoState) -> Self {
        let tasks = state
            .visible_tasks()
            .into_iter()
            .map(|task| ListedTask {
                id: task.id,
                title: task.title.clone(),
                completed: task.completed,
            })
            .collect();
        Self {
            tasks,
            remaining: state.remaining(),
            total: state.tasks().len(),
        }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for task in &self.tasks {
            let mark = if task.completed { "x" } else { " " };
            writeln!(writer, "[{}] #{} {}", mark, task.id, task.title)?;
        }
        writeln!(writer, "{}", SummaryLine::new(self.total, self.remaining))?;
        Ok(())
    }
}

enum SummaryLine {
    Remaining(usize),
    Empty,
}

impl SummaryLine {
    fn new(total: usize, remaining: usize) -> Self {
        if total == 0 {
            SummaryLine::Empty
        } else {
            SummaryLine::Remaining(remaining)
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Remaining(count) => write!(f, "{} items left", count),
            SummaryLine::Empty => write!(f, "No todos yet"),
        }
    }
}
