use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{StatusFilter, TaskId};
use crate::tui::constants::STATUS_HELP;

use super::{App, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListAction {
    Quit,
    FocusEntry,
    SelectNext,
    SelectPrev,
    Toggle,
    Delete,
    Edit,
    ToggleAll,
    ClearCompleted,
    Filter(StatusFilter),
    NextFilter,
    PrevFilter,
    Dismiss,
    ShowHelp,
}

impl ListAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if is_ctrl(key, 'c') {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Tab | KeyCode::BackTab => {
                Some(Self::FocusEntry)
            }
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Char(' ') => Some(Self::Toggle),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::Delete),
            KeyCode::Char('e') | KeyCode::Enter => Some(Self::Edit),
            KeyCode::Char('t') => Some(Self::ToggleAll),
            KeyCode::Char('c') => Some(Self::ClearCompleted),
            KeyCode::Char('1') => Some(Self::Filter(StatusFilter::All)),
            KeyCode::Char('2') => Some(Self::Filter(StatusFilter::Active)),
            KeyCode::Char('3') => Some(Self::Filter(StatusFilter::Completed)),
            KeyCode::Right | KeyCode::Char('l') => Some(Self::NextFilter),
            KeyCode::Left | KeyCode::Char('h') => Some(Self::PrevFilter),
            KeyCode::Esc => Some(Self::Dismiss),
            KeyCode::Char('?') => Some(Self::ShowHelp),
            _ => None,
        }
    }
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.code == KeyCode::Char(ch) && key.modifiers.contains(KeyModifiers::CONTROL)
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Entry => self.handle_entry_mode(key),
            InputMode::List => self.handle_list_mode(key),
            InputMode::Edit(id) => self.handle_edit_mode(id, key),
            InputMode::Help => self.handle_help_mode(key),
        }
        Ok(())
    }

    fn handle_list_mode(&mut self, key: KeyEvent) {
        if let Some(action) = ListAction::from_event(&key) {
            self.execute_list_action(action);
        }
    }

    fn execute_list_action(&mut self, action: ListAction) {
        match action {
            ListAction::Quit => self.quit(),
            ListAction::FocusEntry => self.input_mode = InputMode::Entry,
            ListAction::SelectNext => self.select_next(),
            ListAction::SelectPrev => self.select_prev(),
            ListAction::Toggle => self.toggle_selected(),
            ListAction::Delete => self.delete_selected(),
            ListAction::Edit => self.begin_edit_selected(),
            ListAction::ToggleAll => self.toggle_all(),
            ListAction::ClearCompleted => self.clear_completed(),
            ListAction::Filter(filter) => self.set_filter(filter),
            ListAction::NextFilter => self.cycle_filter(true),
            ListAction::PrevFilter => self.cycle_filter(false),
            ListAction::Dismiss => {
                self.dismiss_error();
            }
            ListAction::ShowHelp => {
                self.input_mode = InputMode::Help;
                self.set_status_info(STATUS_HELP);
            }
        }
    }

    fn handle_entry_mode(&mut self, key: KeyEvent) {
        if is_ctrl(&key, 'c') {
            self.quit();
            return;
        }
        if is_ctrl(&key, 't') {
            self.toggle_all();
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down => {
                self.input_mode = InputMode::List;
                return;
            }
            KeyCode::Esc => {
                if !self.dismiss_error() {
                    self.input_mode = InputMode::List;
                }
                return;
            }
            _ => {}
        }

        if self.entry_disabled() {
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_entry(),
            KeyCode::Backspace => self.entry.backspace(),
            KeyCode::Delete => self.entry.delete_char(),
            KeyCode::Left => self.entry.move_left(),
            KeyCode::Right => self.entry.move_right(),
            KeyCode::Home => self.entry.move_home(),
            KeyCode::End => self.entry.move_end(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.entry.insert_char(ch)
            }
            _ => {}
        }
    }

    fn handle_edit_mode(&mut self, id: TaskId, key: KeyEvent) {
        if is_ctrl(&key, 'c') {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_edit(id, false),
            KeyCode::Esc => self.cancel_edit(id),
            KeyCode::Tab | KeyCode::BackTab => {
                self.submit_edit(id, true);
                self.input_mode = InputMode::Entry;
            }
            KeyCode::Up | KeyCode::Down => {
                self.submit_edit(id, true);
                self.input_mode = InputMode::List;
                if key.code == KeyCode::Up {
                    self.select_prev();
                } else {
                    self.select_next();
                }
            }
            KeyCode::Backspace => self.edit_buffer_mut(id).backspace(),
            KeyCode::Delete => self.edit_buffer_mut(id).delete_char(),
            KeyCode::Left => self.edit_buffer_mut(id).move_left(),
            KeyCode::Right => self.edit_buffer_mut(id).move_right(),
            KeyCode::Home => self.edit_buffer_mut(id).move_home(),
            KeyCode::End => self.edit_buffer_mut(id).move_end(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_buffer_mut(id).insert_char(ch)
            }
            _ => {}
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                self.input_mode = InputMode::List;
                self.status = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use rstest::rstest;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[rstest]
    #[case(KeyCode::Char('1'), ListAction::Filter(StatusFilter::All))]
    #[case(KeyCode::Char('2'), ListAction::Filter(StatusFilter::Active))]
    #[case(KeyCode::Char('3'), ListAction::Filter(StatusFilter::Completed))]
    #[case(KeyCode::Char(' '), ListAction::Toggle)]
    #[case(KeyCode::Delete, ListAction::Delete)]
    #[case(KeyCode::Enter, ListAction::Edit)]
    #[case(KeyCode::Esc, ListAction::Dismiss)]
    fn list_keys_map_to_actions(#[case] code: KeyCode, #[case] expected: ListAction) {
        assert_eq!(ListAction::from_event(&key(code)), Some(expected));
    }

    #[test]
    fn ctrl_c_quits_from_the_list() {
        let mut event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        event.kind = KeyEventKind::Press;
        assert_eq!(ListAction::from_event(&event), Some(ListAction::Quit));
        assert_eq!(
            ListAction::from_event(&key(KeyCode::Char('c'))),
            Some(ListAction::ClearCompleted)
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(ListAction::from_event(&key(KeyCode::Char('z'))), None);
    }
}
