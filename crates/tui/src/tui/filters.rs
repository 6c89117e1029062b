use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::TodoState;
use crate::model::StatusFilter;

use super::helpers::{BG_ACCENT, FG_ACCENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClearControl {
    Hidden,
    Enabled,
    Disabled,
}

/// Footer model: remaining count, filter selector and the clear-completed
/// control. Absent when the list is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SummaryBar {
    pub(crate) remaining: usize,
    pub(crate) selected: StatusFilter,
    pub(crate) clear: ClearControl,
}

impl SummaryBar {
    pub(crate) fn from_state(state: &TodoState) -> Option<Self> {
        if state.tasks().is_empty() {
            return None;
        }
        let clear = if !state.has_completed() {
            ClearControl::Hidden
        } else if state.is_clearing() {
            ClearControl::Disabled
        } else {
            ClearControl::Enabled
        };
        Some(Self {
            remaining: state.remaining(),
            selected: state.filter(),
            clear,
        })
    }

    pub(crate) fn counter_text(&self) -> String {
        format!("{} items left", self.remaining)
    }

    pub(crate) fn filter_spans(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::with_capacity(StatusFilter::ALL.len() * 2);
        for (idx, filter) in StatusFilter::ALL.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw(" "));
            }
            let label = format!(" {} {} ", idx + 1, filter.label());
            let style = if *filter == self.selected {
                Style::default()
                    .fg(FG_ACCENT)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(label, style));
        }
        spans
    }

    pub(crate) fn clear_span(&self) -> Option<Span<'static>> {
        match self.clear {
            ClearControl::Hidden => None,
            ClearControl::Enabled => Some(Span::styled(
                "c Clear completed",
                Style::default().fg(Color::Gray),
            )),
            ClearControl::Disabled => Some(Span::styled(
                "c Clear completed",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )),
        }
    }

    pub(crate) fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(self.counter_text(), Style::default().fg(Color::White)),
            Span::raw("   "),
        ];
        spans.extend(self.filter_spans());
        if let Some(clear) = self.clear_span() {
            spans.push(Span::raw("   "));
            spans.push(clear);
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::core::TaskListController;
    use pretty_assertions::assert_eq;
    use todos_core::testing::{task, FakeTransport};

    #[tokio::test]
    async fn clear_control_is_disabled_while_clearing() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", true), task(2, "B", false)]);
        let gate = fake.hold_deletes();
        let controller = Arc::new(TaskListController::new(fake.clone(), 1));
        controller.load().await;
        assert_eq!(
            controller.with_state(SummaryBar::from_state).map(|bar| bar.clear),
            Some(ClearControl::Enabled)
        );

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.clear_completed().await });
        for _ in 0..200 {
            if fake.delete_calls() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let bar = controller.with_state(SummaryBar::from_state).unwrap();
        assert_eq!(bar.clear, ClearControl::Disabled);
        assert_eq!(bar.counter_text(), "1 items left");

        gate.open();
        handle.await.unwrap();
        assert_eq!(
            controller.with_state(SummaryBar::from_state).map(|bar| bar.clear),
            Some(ClearControl::Hidden)
        );
    }
}
