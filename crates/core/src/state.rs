//! Application state shared between the controller and the views that render it.

use std::time::{Duration, Instant};

use crate::error::ErrorKind;
use crate::loading::BusySet;
use crate::model::{filter_tasks, NewTask, Slot, StatusFilter, Task, TaskId};

/// How long an error stays visible after it last changed.
pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RaisedError {
    kind: ErrorKind,
    raised_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct TodoState {
    pub(crate) tasks: Vec<Task>,
    pub(crate) filter: StatusFilter,
    pub(crate) error: Option<RaisedError>,
    pub(crate) pending: Option<NewTask>,
    pub(crate) busy: BusySet,
    pub(crate) clearing: bool,
}

impl TodoState {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.error.map(|raised| raised.kind)
    }

    pub fn pending(&self) -> Option<&NewTask> {
        self.pending.as_ref()
    }

    pub fn busy(&self) -> &BusySet {
        &self.busy
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.filter)
    }

    /// Visible tasks followed by the pending create, if any.
    pub fn rows(&self) -> Vec<Slot<'_>> {
        let mut rows: Vec<Slot<'_>> = self
            .visible_tasks()
            .into_iter()
            .map(Slot::Persisted)
            .collect();
        if let Some(draft) = &self.pending {
            rows.push(Slot::PendingCreate(draft));
        }
        rows
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_active()).count()
    }

    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|task| task.completed)
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|task| task.completed)
    }

    pub fn is_busy(&self, id: TaskId) -> bool {
        self.busy.contains(id)
    }

    pub(crate) fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        for task in tasks {
            if self.task(task.id).is_none() {
                self.tasks.push(task);
            }
        }
    }

    /// Append `task`, or replace the stored task carrying the same id.
    pub(crate) fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub(crate) fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub(crate) fn set_completed(&mut self, ids: &BusySet, completed: bool) {
        for task in self.tasks.iter_mut().filter(|task| ids.contains(task.id)) {
            task.completed = completed;
        }
    }

    pub(crate) fn raise(&mut self, kind: ErrorKind) {
        self.raise_at(kind, Instant::now());
    }

    pub(crate) fn raise_at(&mut self, kind: ErrorKind, now: Instant) {
        self.error = Some(RaisedError {
            kind,
            raised_at: now,
        });
    }

    pub(crate) fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Clear the error if it has been showing for [`ERROR_DISMISS_AFTER`].
    pub(crate) fn expire_error(&mut self, now: Instant) -> bool {
        match self.error {
            Some(raised) if now.saturating_duration_since(raised.raised_at) >= ERROR_DISMISS_AFTER => {
                self.error = None;
                true
            }
            _ => false,
        }
    }
}
