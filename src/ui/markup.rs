//! Styled rendering of panel markup.
//!
//! Panels carry a small markdown subset: `#`/`##` headings, `- ` list
//! items, `|`-delimited table rows, `_emphasis_` and `` `code` ``.

use super::Palette;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Convert panel markup into styled lines.
pub fn markup_lines(text: &str, palette: &Palette) -> Vec<Line<'static>> {
    text.lines().map(|line| markup_line(line, palette)).collect()
}

fn markup_line(line: &str, palette: &Palette) -> Line<'static> {
    let base = Style::default().fg(palette.foreground);

    if let Some(title) = line.strip_prefix("# ") {
        return Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));
    }
    if let Some(title) = line.strip_prefix("## ") {
        return Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if line.starts_with('|') {
        return table_row(line, palette);
    }
    if line.starts_with("⚠️") {
        return Line::from(inline_spans(line, base.fg(palette.alert), palette));
    }

    let trimmed = line.trim_start();
    if let Some(item) = trimmed.strip_prefix("- ") {
        let indent = &line[..line.len() - trimmed.len()];
        let mut spans = vec![Span::styled(format!("{}• ", indent), base)];
        match item.split_once(": ") {
            Some((label, value)) => {
                spans.push(Span::styled(format!("{}: ", label), base.fg(palette.key)));
                spans.extend(inline_spans(value, base.fg(palette.value), palette));
            },
            None => spans.extend(inline_spans(item, base, palette)),
        }
        return Line::from(spans);
    }

    Line::from(inline_spans(line, base, palette))
}

fn table_row(line: &str, palette: &Palette) -> Line<'static> {
    let cells: Vec<&str> = line
        .trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split(" | ")
        .map(str::trim)
        .collect();

    let border = Style::default().fg(palette.frame);
    if cells.iter().all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-')) {
        return Line::from(Span::styled("─".repeat(line.chars().count()), border));
    }

    let mut spans = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", border));
        }
        let style = match i {
            0 => Style::default().fg(palette.key),
            1 => Style::default().fg(palette.foreground),
            _ => Style::default().fg(palette.value),
        };
        spans.extend(inline_spans(cell, style, palette));
    }
    Line::from(spans)
}

/// Split `text` into plain, `code` and `_emphasis_` spans.
fn inline_spans(text: &str, base: Style, palette: &Palette) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, part) in text.split('`').enumerate() {
        if part.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            spans.push(Span::styled(part.to_string(), Style::default().fg(palette.value)));
        } else {
            push_emphasis(&mut spans, part, base, palette);
        }
    }
    spans
}

fn push_emphasis(spans: &mut Vec<Span<'static>>, text: &str, base: Style, palette: &Palette) {
    let emphasis = base.fg(palette.emphasis).add_modifier(Modifier::ITALIC);
    let mut rest = text;

    while let Some(open) = find_open(rest) {
        let after = &rest[open + 1..];
        let Some(close) = find_close(after) else {
            break;
        };
        if open > 0 {
            spans.push(Span::styled(rest[..open].to_string(), base));
        }
        spans.push(Span::styled(after[..close].to_string(), emphasis));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }
}

/// An opening `_` starts the text or follows whitespace.
fn find_open(s: &str) -> Option<usize> {
    s.char_indices()
        .find(|&(i, c)| c == '_' && (i == 0 || s[..i].ends_with(char::is_whitespace)))
        .map(|(i, _)| i)
}

/// A closing `_` is not the first char and is not followed by a word char.
fn find_close(s: &str) -> Option<usize> {
    s.char_indices()
        .find(|&(i, c)| {
            c == '_' && i > 0 && s[i + 1..].chars().next().map_or(true, |n| !n.is_alphanumeric())
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_headings() {
        let palette = Palette::default();
        let lines = markup_lines("# /grp/ds\n## Attributes", &palette);
        assert_eq!(texts(&lines[0]), vec!["/grp/ds"]);
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(texts(&lines[1]), vec!["Attributes"]);
    }

    #[test]
    fn test_table_rows() {
        let palette = Palette::default();
        let lines = markup_lines(
            "| Key | Type | Value |\n| --- | ---- | ----- |\n| grid | array(2,) | `[1, 2]` |",
            &palette,
        );
        assert_eq!(texts(&lines[0]), vec!["Key", " │ ", "Type", " │ ", "Value"]);
        assert!(lines[1].spans[0].content.starts_with('─'));
        assert_eq!(texts(&lines[2]), vec!["grid", " │ ", "array(2,)", " │ ", "[1, 2]"]);
    }

    #[test]
    fn test_list_items() {
        let palette = Palette::default();
        let line = markup_line(" - min: 1", &palette);
        assert_eq!(texts(&line), vec![" • ", "min: ", "1"]);
    }

    #[test]
    fn test_emphasis_and_code() {
        let palette = Palette::default();
        let line = markup_line("⚠️ _Error reading dataset_: `boom`", &palette);
        assert_eq!(texts(&line), vec!["⚠️ ", "Error reading dataset", ": ", "boom"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_underscores_inside_words_are_plain() {
        let palette = Palette::default();
        let line = markup_line("scale_factor and add_offset", &palette);
        assert_eq!(texts(&line), vec!["scale_factor and add_offset"]);
    }
}
