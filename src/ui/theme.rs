//! Gruvbox dark palette, by role.

use ratatui::style::Color;

/// Colors the panels draw with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Panel background; also the text color on accent fills.
    pub background: Color,
    /// Plain text.
    pub foreground: Color,
    /// Headings, the header badge and the tree cursor.
    pub accent: Color,
    /// Attribute keys and list labels.
    pub key: Color,
    /// Values and inline code.
    pub value: Color,
    /// Panel borders and table rules.
    pub frame: Color,
    /// Header and status bar fill.
    pub bar: Color,
    /// `_emphasis_` in panel text.
    pub emphasis: Color,
    /// Warning lines.
    pub alert: Color,
}

impl Palette {
    /// The only palette h5lens ships.
    pub const GRUVBOX_DARK: Palette = Palette {
        background: Color::Rgb(40, 40, 40),
        foreground: Color::Rgb(235, 219, 178),
        accent: Color::Rgb(251, 184, 108),
        key: Color::Rgb(184, 187, 38),
        value: Color::Rgb(142, 192, 124),
        frame: Color::Rgb(102, 92, 84),
        bar: Color::Rgb(60, 56, 54),
        emphasis: Color::Rgb(250, 189, 47),
        alert: Color::Rgb(251, 73, 52),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::GRUVBOX_DARK
    }
}
