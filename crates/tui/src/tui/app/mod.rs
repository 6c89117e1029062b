use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::widgets::ListState;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::buffer::TextBuffer;
use super::constants::*;
use crate::core::TaskListController;
use crate::model::{StatusFilter, Task, TaskId};

mod entry;
mod input;
mod message;
mod render;
mod row;

use message::Message;
use row::RowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Entry,
    List,
    Edit(TaskId),
    Help,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

pub(crate) struct App {
    controller: Arc<TaskListController>,
    runtime: Handle,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    in_flight: usize,
    input_mode: InputMode,
    entry: TextBuffer,
    adding: bool,
    rows: HashMap<TaskId, RowState>,
    selected: usize,
    list_state: ListState,
    last_task_count: usize,
    refocus_pending: bool,
    status: Option<StatusMessage>,
    tick: usize,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(controller: Arc<TaskListController>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            runtime,
            tx,
            rx,
            in_flight: 0,
            input_mode: InputMode::Entry,
            entry: TextBuffer::new(),
            adding: false,
            rows: HashMap::new(),
            selected: 0,
            list_state: ListState::default(),
            last_task_count: 0,
            refocus_pending: false,
            status: None,
            tick: 0,
            should_quit: false,
        }
    }

    /// Kick off the initial fetch.
    pub(crate) fn start(&mut self) {
        self.set_status_info(STATUS_LOADING);
        let controller = self.controller.clone();
        self.spawn(async move {
            Message::Loaded {
                ok: controller.load().await,
            }
        });
    }

    fn spawn<F>(&mut self, operation: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let message = operation.await;
            let _ = tx.send(message);
        });
    }

    /// Apply every completion notice that has arrived since the last frame.
    pub(crate) fn drain_messages(&mut self) {
        let mut received = false;
        while let Ok(message) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(message);
            received = true;
        }
        if received {
            self.sync_rows();
        }
    }

    fn apply(&mut self, message: Message) {
        debug!(?message, "operation settled");
        match message {
            Message::Loaded { ok } => {
                if ok {
                    let count = self.controller.with_state(|state| state.tasks().len());
                    self.set_status_info(format!("Loaded {} todos", count));
                } else {
                    self.status = None;
                }
            }
            Message::Added { ok } => {
                self.adding = false;
                if ok {
                    self.entry.clear();
                }
                self.refocus_pending = true;
            }
            Message::RowSettled { id } => {
                if let Some(row) = self.rows.get_mut(&id) {
                    row.busy = false;
                }
            }
            Message::TitleSaved { id, failed } => {
                if let Some(row) = self.rows.get_mut(&id) {
                    row.busy = false;
                    if !failed {
                        row.editing = false;
                    }
                }
                if !failed && self.input_mode == InputMode::Edit(id) {
                    self.input_mode = InputMode::List;
                }
            }
            Message::Cleared(outcome) => {
                if !outcome.removed.is_empty() {
                    self.set_status_info(format!("Cleared {} completed", outcome.removed.len()));
                }
            }
            Message::ToggledAll { ok } => {
                if ok {
                    let remaining = self.controller.with_state(|state| state.remaining());
                    self.set_status_info(format!("{} items left", remaining));
                }
            }
        }
    }

    /// Reconcile row-local state and focus with the controller's collection.
    fn sync_rows(&mut self) {
        let (ids, pending) = self.controller.with_state(|state| {
            let ids: BTreeSet<TaskId> = state.tasks().iter().map(|task| task.id).collect();
            (ids, state.pending().is_some())
        });

        self.rows.retain(|id, _| ids.contains(id));
        if let InputMode::Edit(id) = self.input_mode {
            if !ids.contains(&id) {
                self.input_mode = InputMode::List;
            }
        }

        if ids.len() != self.last_task_count {
            self.last_task_count = ids.len();
            self.refocus_pending = true;
        }
        if self.refocus_pending && !pending && !self.adding {
            if self.input_mode == InputMode::List {
                self.input_mode = InputMode::Entry;
            }
            self.refocus_pending = false;
        }

        self.clamp_selection();
    }

    pub(crate) fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.controller.expire_error();
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn quit(&mut self) {
        self.controller.shutdown();
        self.should_quit = true;
    }

    fn entry_disabled(&self) -> bool {
        self.adding || self.controller.with_state(|state| state.pending().is_some())
    }

    fn row_count(&self) -> usize {
        self.controller.with_state(|state| state.rows().len())
    }

    /// The persisted task under the selection, if any.
    fn selected_task(&self) -> Option<Task> {
        self.controller.with_state(|state| {
            state
                .visible_tasks()
                .get(self.selected)
                .map(|task| (*task).clone())
        })
    }

    fn select_next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(count - 1);
        self.list_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
        self.list_state.select(Some(self.selected));
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            if self.selected >= count {
                self.selected = count - 1;
            }
            self.list_state.select(Some(self.selected));
        }
    }

    fn set_filter(&mut self, filter: StatusFilter) {
        self.controller.set_filter(filter);
        self.clamp_selection();
    }

    fn cycle_filter(&mut self, forward: bool) {
        let current = self.controller.with_state(|state| state.filter());
        let next = if forward { current.next() } else { current.prev() };
        self.set_filter(next);
    }

    fn dismiss_error(&mut self) -> bool {
        let showing = self.controller.with_state(|state| state.error().is_some());
        if showing {
            self.controller.dismiss_error();
        }
        showing
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        self.status = Some(StatusMessage::new(message, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        self.status = Some(StatusMessage::new(message, StatusKind::Error));
    }
}
