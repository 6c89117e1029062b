use crate::capture::{compose_draft, CaptureError};
use crate::core::ErrorKind;
use crate::tui::constants::STATUS_ENTRY_BUSY;

use super::message::Message;
use super::App;

impl App {
    /// Validate the entry text and create a task from it. The text is only
    /// cleared once the store accepted it.
    pub(super) fn submit_entry(&mut self) {
        if self.entry_disabled() {
            self.set_status_info(STATUS_ENTRY_BUSY);
            return;
        }
        let draft = match compose_draft(self.controller.user_id(), self.entry.as_str()) {
            Ok(draft) => draft,
            Err(CaptureError::EmptyTitle) => {
                self.controller.report(ErrorKind::EmptyTitle);
                return;
            }
        };

        self.adding = true;
        let controller = self.controller.clone();
        self.spawn(async move {
            Message::Added {
                ok: controller.add(draft).await,
            }
        });
    }

    pub(super) fn toggle_all(&mut self) {
        let has_tasks = self
            .controller
            .with_state(|state| !state.tasks().is_empty());
        if !has_tasks {
            return;
        }
        let controller = self.controller.clone();
        self.spawn(async move {
            Message::ToggledAll {
                ok: controller.toggle_all().await,
            }
        });
    }

    pub(super) fn clear_completed(&mut self) {
        let available = self
            .controller
            .with_state(|state| state.has_completed() && !state.is_clearing());
        if !available {
            return;
        }
        let controller = self.controller.clone();
        self.spawn(async move { Message::Cleared(controller.clear_completed().await) });
    }
}
