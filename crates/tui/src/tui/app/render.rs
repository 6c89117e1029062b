use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::core::TodoState;
use crate::model::Slot;
use crate::tui::constants::{APP_VERSION, EDIT_PLACEHOLDER, ENTRY_PLACEHOLDER};
use crate::tui::filters::SummaryBar;
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, checkbox, inset_rect, spinner_frame, BG_ACCENT,
    BG_BASE, BG_PANEL, FG_ACCENT, FG_DANGER,
};

use super::{App, InputMode};

const HIGHLIGHT_SYMBOL: &str = "▶ ";

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let state = self.controller.snapshot();
        let summary = SummaryBar::from_state(&state);

        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(if summary.is_some() { 1 } else { 0 }),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_entry(f, chunks[1], &state);
        self.draw_rows(f, chunks[2], &state);
        if let Some(summary) = summary {
            f.render_widget(
                Paragraph::new(summary.line()).style(Style::default().bg(BG_BASE)),
                chunks[3],
            );
        }
        self.draw_error_banner(f, chunks[4], &state);
        self.draw_footer(f, chunks[5]);

        if self.input_mode == InputMode::Help {
            self.draw_help_overlay(f, size);
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                " todos ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("v{}", APP_VERSION),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  "),
            Span::styled(
                format!("user #{}", self.controller.user_id()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(BG_BASE)),
            area,
        );
    }

    fn draw_entry(&self, f: &mut Frame<'_>, area: Rect, state: &TodoState) {
        let focused = self.input_mode == InputMode::Entry;
        let disabled = self.adding || state.pending().is_some();

        let border = if focused {
            Style::default().fg(FG_ACCENT)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("New todo"))
            .border_style(border)
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let toggle = if state.tasks().is_empty() {
            Span::raw("  ")
        } else if state.all_completed() {
            Span::styled("✔ ", Style::default().fg(Color::Green))
        } else {
            Span::styled("✔ ", Style::default().fg(Color::DarkGray))
        };
        let text = if self.entry.is_empty() {
            Span::styled(ENTRY_PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.entry.as_str().to_string())
        };
        let mut style = Style::default().bg(BG_PANEL);
        if disabled {
            style = style.add_modifier(Modifier::DIM);
        }
        f.render_widget(Paragraph::new(Line::from(vec![toggle, text])).style(style), inner);

        if focused && !disabled && inner.width > 2 {
            let column = self.entry.cursor_column() as u16 + 2;
            f.set_cursor(inner.x + column.min(inner.width - 1), inner.y);
        }
    }

    fn draw_rows(&mut self, f: &mut Frame<'_>, area: Rect, state: &TodoState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(state.filter().label()))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        let slots = state.rows();
        if slots.is_empty() {
            let inner = block.inner(area);
            f.render_widget(block, area);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
            let message = if state.tasks().is_empty() {
                "Nothing to do yet. Type a todo above and press Enter."
            } else {
                "No todos match this filter."
            };
            let content = centered_rect(inner.width, 1, inner);
            f.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::DarkGray).bg(BG_PANEL)),
                content,
            );
            return;
        }

        let items: Vec<ListItem> = slots
            .iter()
            .map(|slot| self.row_item(slot, state))
            .collect();
        let list_focused = matches!(self.input_mode, InputMode::List | InputMode::Edit(_));
        let highlight = if list_focused {
            Style::default()
                .fg(Color::Yellow)
                .bg(BG_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(BG_ACCENT)
        };
        let inner = block.inner(area);
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol(HIGHLIGHT_SYMBOL);
        f.render_stateful_widget(list, area, &mut self.list_state);

        if let InputMode::Edit(id) = self.input_mode {
            let Some(row) = self.rows.get(&id) else {
                return;
            };
            let offset = self.selected.saturating_sub(self.list_state.offset()) as u16;
            let prefix = (HIGHLIGHT_SYMBOL.chars().count() + 4) as u16;
            let column = prefix + row.buffer.cursor_column() as u16;
            if offset < inner.height && inner.width > 0 {
                f.set_cursor(inner.x + column.min(inner.width - 1), inner.y + offset);
            }
        }
    }

    fn row_item(&self, slot: &Slot<'_>, state: &TodoState) -> ListItem<'static> {
        let (marker, busy) = match slot {
            Slot::PendingCreate(_) => (spinner_frame(self.tick), true),
            Slot::Persisted(task) if self.row_is_busy(task.id, state) => {
                (spinner_frame(self.tick), true)
            }
            Slot::Persisted(task) => (checkbox(task.completed), false),
        };
        let marker_style = if busy {
            Style::default().fg(FG_ACCENT)
        } else if slot.completed() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let editing = slot
            .id()
            .and_then(|id| self.rows.get(&id))
            .filter(|row| row.editing);
        let title = match editing {
            Some(row) if row.buffer.is_empty() => Span::styled(
                EDIT_PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Some(row) => Span::styled(
                row.buffer.as_str().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            None if slot.is_pending() => Span::styled(
                slot.title().to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
            None if slot.completed() => Span::styled(
                slot.title().to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
            ),
            None => Span::raw(slot.title().to_string()),
        };

        ListItem::new(Line::from(vec![
            Span::styled(format!("{:<3} ", marker), marker_style),
            title,
        ]))
    }

    fn draw_error_banner(&self, f: &mut Frame<'_>, area: Rect, state: &TodoState) {
        let Some(kind) = state.error() else {
            return;
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" ✖ {} ", kind.message()),
                Style::default()
                    .fg(Color::White)
                    .bg(FG_DANGER)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Esc to dismiss", Style::default().fg(Color::DarkGray)),
        ]);
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(BG_BASE)),
            area,
        );
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            let help = match self.input_mode {
                InputMode::Entry => {
                    "Enter add • Tab list • Ctrl+T toggle all • Esc dismiss/list • Ctrl+C quit"
                }
                InputMode::List => {
                    "j/k move • Space toggle • e edit • x delete • t toggle all • c clear • 1/2/3 filter • ? help • q quit"
                }
                InputMode::Edit(_) => "Enter save • Esc cancel • Tab save & leave",
                InputMode::Help => "Enter/Esc to close",
            };
            Line::from(vec![Span::styled(help, Style::default().fg(Color::DarkGray))])
        };
        f.render_widget(Paragraph::new(line), area);
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 80);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(10);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{:<20}", combo), Style::default().fg(Color::Cyan)),
                    Span::raw(desc),
                ])
            })
            .collect();

        f.render_widget(
            Paragraph::new(help_lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }
}
