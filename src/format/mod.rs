//! Text formatting for panels and the header.
//!
//! Everything here is pure: it turns container values into the markup
//! strings the panels display.

pub mod array;
pub mod attribute;
pub mod header;
pub mod size;

pub use array::{render_array, ArrayLayout};
pub use attribute::{attribute_table, format_attribute, metadata_text};
pub use header::header_text;
pub use size::human_readable_size;

use unicode_width::UnicodeWidthChar;

/// Display columns kept of any single rendered string value.
pub const MAX_VALUE_WIDTH: usize = 80;

/// Format a shape the way Python prints tuples: `()`, `(3,)`, `(2, 3)`.
pub fn shape_tuple(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [only] => format!("({},)", only),
        dims => format!(
            "({})",
            dims.iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Make a value safe to place in a single table cell.
pub(crate) fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Cut `text` to at most [`MAX_VALUE_WIDTH`] display columns, marking the cut
/// with `...`.
pub fn clip_text(text: &str) -> String {
    let mut width = 0;
    for (idx, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > MAX_VALUE_WIDTH {
            return format!("{}...", &text[..idx]);
        }
    }
    text.to_string()
}
