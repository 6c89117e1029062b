use crate::capture::normalize_title;
use crate::core::TodoState;
use crate::model::{TaskChange, TaskId};
use crate::tui::buffer::TextBuffer;
use crate::tui::constants::STATUS_NOTHING_SELECTED;

use super::message::Message;
use super::{App, InputMode};

/// Per-row local state. `busy` covers the row's own in-flight call; bulk
/// operations are tracked by the controller's busy set instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct RowState {
    pub(crate) busy: bool,
    pub(crate) editing: bool,
    pub(crate) buffer: TextBuffer,
}

impl App {
    fn row_mut(&mut self, id: TaskId) -> &mut RowState {
        self.rows.entry(id).or_default()
    }

    /// Own call in flight, or part of a bulk operation.
    pub(super) fn row_is_busy(&self, id: TaskId, state: &TodoState) -> bool {
        self.rows.get(&id).is_some_and(|row| row.busy) || state.is_busy(id)
    }

    fn selection_is_pending(&self) -> bool {
        self.controller.with_state(|state| {
            state
                .rows()
                .get(self.selected)
                .is_some_and(|row| row.is_pending())
        })
    }

    pub(super) fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        let id = task.id;
        self.row_mut(id).busy = true;
        let controller = self.controller.clone();
        self.spawn(async move {
            let change = TaskChange::Completed(!task.completed);
            controller.update(&task, change).await;
            Message::RowSettled { id }
        });
    }

    pub(super) fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        self.delete_row(task.id);
    }

    fn delete_row(&mut self, id: TaskId) {
        self.row_mut(id).busy = true;
        let controller = self.controller.clone();
        self.spawn(async move {
            controller.delete(id).await;
            Message::RowSettled { id }
        });
    }

    /// Open the inline editor on the selected row. A row whose last save
    /// failed keeps its unsaved text.
    pub(super) fn begin_edit_selected(&mut self) {
        if self.selection_is_pending() {
            self.set_status_error("This todo is still being saved");
            return;
        }
        let Some(task) = self.selected_task() else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        let row = self.row_mut(task.id);
        if !row.editing {
            row.buffer.set(task.title.clone());
            row.editing = true;
        }
        self.input_mode = InputMode::Edit(task.id);
    }

    /// Commit the editor of row `id`. `blur` marks focus leaving the row,
    /// which also closes an unchanged editor.
    pub(super) fn submit_edit(&mut self, id: TaskId, blur: bool) {
        let Some(task) = self.controller.with_state(|state| state.task(id).cloned()) else {
            self.rows.remove(&id);
            self.input_mode = InputMode::List;
            return;
        };
        let row = self.row_mut(id);
        if row.busy {
            return;
        }
        let text = row.buffer.as_str().to_string();

        if text == task.title {
            row.busy = false;
            if blur {
                row.editing = false;
            }
            return;
        }

        match normalize_title(&text) {
            None => self.delete_row(id),
            Some(title) => {
                row.busy = true;
                let controller = self.controller.clone();
                self.spawn(async move {
                    let failed = controller.update(&task, TaskChange::Title(title)).await;
                    Message::TitleSaved { id, failed }
                });
            }
        }
    }

    /// Leave the editor without saving and restore the stored title.
    pub(super) fn cancel_edit(&mut self, id: TaskId) {
        let title = self
            .controller
            .with_state(|state| state.task(id).map(|task| task.title.clone()));
        if let Some(row) = self.rows.get_mut(&id) {
            row.editing = false;
            if let Some(title) = title {
                row.buffer.set(title);
            }
        }
        self.input_mode = InputMode::List;
    }

    pub(super) fn edit_buffer_mut(&mut self, id: TaskId) -> &mut TextBuffer {
        &mut self.row_mut(id).buffer
    }
}
