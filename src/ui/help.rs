//! Help overlay.

use super::Palette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const BINDINGS: [(&str, &str); 9] = [
    ("j/k, ↓/↑", "Move the cursor"),
    ("l/h, →/←", "Expand/collapse group"),
    ("gg / G", "First/last node"),
    ("Ctrl-f / Ctrl-b", "Page down/up"),
    ("i", "Inspect the highlighted dataset"),
    ("J/K, Ctrl-d/u", "Scroll the data panel"),
    ("?", "Toggle this help"),
    ("Esc", "Close this help"),
    ("q", "Quit"),
];

/// Draw the help overlay centered over the browser.
pub(super) fn draw_help(f: &mut Frame<'_>, palette: &Palette) {
    let area = centered_rect(60, 60, f.area());

    let mut lines = vec![
        Line::from(Span::styled(
            "Key bindings",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (keys, action) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", keys), Style::default().fg(palette.key)),
            Span::styled(action.to_string(), Style::default().fg(palette.value)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Inspections stream in chunks; moving the cursor cancels a pending one.",
        Style::default().fg(palette.foreground),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .style(Style::default().bg(palette.background)),
    );

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
