use std::cmp::min;

use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::helpers::{accent_title, centered_rect, inset_rect, BG_BASE, BG_PANEL, FG_DANGER};

/// Shown instead of the task list when no user id is configured.
pub(crate) fn draw_config_warning(f: &mut Frame<'_>, detail: &str) {
    let size = f.size();
    f.render_widget(Clear, size);
    f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);

    let width = min(size.width.saturating_sub(4), 76);
    let popup = centered_rect(width, 12, size);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(accent_title("todos"))
        .border_style(Style::default().fg(FG_DANGER))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let lines = warning_lines(detail);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(BG_PANEL)),
        inset_rect(inner, 1),
    );
}

fn warning_lines(detail: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "A user id is required before todos can be loaded.",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Set it with one of:"),
        Line::from("  todos --user-id <ID>"),
        Line::from("  export TODOS_USER_ID=<ID>"),
        Line::from("  \"userId\": <ID> in config.json"),
        Line::from(""),
        Line::from(Span::styled(
            detail.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press q or Esc to exit.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}
