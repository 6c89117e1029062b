use std::cmp::min;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::constants::SPINNER_FRAMES;

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);
pub const FG_DANGER: Color = Color::Rgb(235, 87, 87);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Enter (new todo)", "Add the typed todo"),
        ("Tab / ↓", "Move focus from the new-todo field to the list"),
        ("Ctrl+T", "Toggle all todos complete / active"),
        ("j / k or ↓ / ↑", "Move selection"),
        ("Space", "Toggle the selected todo"),
        ("Enter / e", "Edit the selected title"),
        ("x / Delete", "Delete the selected todo"),
        ("t", "Toggle all todos complete / active"),
        ("c", "Clear completed todos"),
        ("1 / 2 / 3 or ← / →", "Show All / Active / Completed"),
        ("a / i / Tab", "Focus the new-todo field"),
        ("Esc", "Dismiss the error banner or cancel editing"),
        ("?", "Toggle this help overlay"),
        ("q / Ctrl+C", "Quit"),
    ]
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}
