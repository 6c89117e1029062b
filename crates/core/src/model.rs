use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type TaskId = u64;
pub type UserId = u64;

/// A task as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl Task {
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Copy of this task with a single field overlaid.
    pub fn with_change(&self, change: &TaskChange) -> Task {
        let mut updated = self.clone();
        match change {
            TaskChange::Title(title) => updated.title = title.clone(),
            TaskChange::Completed(completed) => updated.completed = *completed,
        }
        updated
    }
}

/// Body of a create call; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl From<&Task> for NewTask {
    fn from(task: &Task) -> Self {
        Self {
            user_id: task.user_id,
            title: task.title.clone(),
            completed: task.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Title(String),
    Completed(bool),
}

impl TaskChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskChange::Title(_) => "title",
            TaskChange::Completed(_) => "completed",
        }
    }
}

/// One visible row: either a persisted task or the draft whose create is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<'a> {
    Persisted(&'a Task),
    PendingCreate(&'a NewTask),
}

impl<'a> Slot<'a> {
    pub fn id(&self) -> Option<TaskId> {
        match self {
            Slot::Persisted(task) => Some(task.id),
            Slot::PendingCreate(_) => None,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Slot::Persisted(task) => &task.title,
            Slot::PendingCreate(draft) => &draft.title,
        }
    }

    pub fn completed(&self) -> bool {
        match self {
            Slot::Persisted(task) => task.completed,
            Slot::PendingCreate(draft) => draft.completed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::PendingCreate(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            StatusFilter::All => 0,
            StatusFilter::Active => 1,
            StatusFilter::Completed => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(anyhow!(
                "Unknown filter '{}': expected all|active|completed",
                other
            )),
        }
    }
}

impl ValueEnum for StatusFilter {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Order-preserving projection of `tasks` onto `filter`.
pub fn filter_tasks(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}
