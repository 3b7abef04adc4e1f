//! Browser UI rendering.

use super::{markup_lines, Palette};
use crate::container::ContainerAccess;
use crate::session::{Session, SessionState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

const KEYMAP: &str = "q:quit | hjkl:nav | gg/G:first/last | i:inspect | J/K:scroll data | ?:help";

/// Draw the browser UI.
pub(super) fn draw_browser<C: ContainerAccess>(f: &mut Frame<'_>, session: &mut Session<C>, palette: &Palette) {
    // Header, content, status bar and key map bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, session, chunks[0], palette);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(content[1]);

    draw_tree(f, session, content[0], palette);
    draw_metadata(f, session, panels[0], palette);
    draw_data(f, session, panels[1], palette);

    let status = Paragraph::new(session.status().to_string())
        .style(Style::default().fg(palette.foreground).bg(palette.bar));
    f.render_widget(status, chunks[2]);

    let keymap = Paragraph::new(KEYMAP).style(Style::default().fg(palette.foreground).bg(palette.background));
    f.render_widget(keymap, chunks[3]);
}

fn draw_header<C: ContainerAccess>(f: &mut Frame<'_>, session: &Session<C>, area: Rect, palette: &Palette) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", session.title()),
            Style::default()
                .fg(palette.background)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", session.subtitle()), Style::default().fg(palette.foreground)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(palette.bar)),
        area,
    );
}

fn draw_tree<C: ContainerAccess>(f: &mut Frame<'_>, session: &mut Session<C>, area: Rect, palette: &Palette) {
    let viewport = area.height.saturating_sub(2) as usize;
    session.view_mut().adjust_scroll(viewport);

    let view = session.view();
    let cursor = view.cursor();
    let offset = view.scroll_offset();

    let items: Vec<ListItem<'_>> = view
        .visible_items()
        .iter()
        .enumerate()
        .skip(offset)
        .take(viewport)
        .map(|(idx, item)| {
            let indent = "  ".repeat(item.level);
            let expand_icon = match (item.expandable, item.expanded) {
                (true, true) => "▼ ",
                (true, false) => "▶ ",
                (false, _) => "  ",
            };

            let text = format!("{}{}{}", indent, expand_icon, item.label);

            let style = if idx == cursor {
                Style::default()
                    .fg(palette.background)
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.foreground)
            };

            ListItem::new(Line::from(text)).style(style)
        })
        .collect();

    let list = List::new(items).block(panel_block(" Tree ".to_string(), palette));
    f.render_widget(list, area);
}

fn draw_metadata<C: ContainerAccess>(f: &mut Frame<'_>, session: &Session<C>, area: Rect, palette: &Palette) {
    let paragraph = Paragraph::new(markup_lines(session.metadata(), palette))
        .block(panel_block(" Metadata ".to_string(), palette))
        .style(Style::default().fg(palette.foreground))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn draw_data<C: ContainerAccess>(f: &mut Frame<'_>, session: &Session<C>, area: Rect, palette: &Palette) {
    let title = if session.state() == SessionState::Inspecting {
        " Data (inspecting) ".to_string()
    } else {
        " Data ".to_string()
    };

    let paragraph = Paragraph::new(markup_lines(session.data(), palette))
        .block(panel_block(title, palette))
        .style(Style::default().fg(palette.foreground))
        .wrap(Wrap { trim: false })
        .scroll((session.data_scroll(), 0));

    f.render_widget(paragraph, area);
}

fn panel_block(title: String, palette: &Palette) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.frame))
        .style(Style::default().bg(palette.background))
}
