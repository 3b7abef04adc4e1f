//! User interface rendering.

mod browser;
mod help;
mod markup;
mod theme;

use crate::container::ContainerAccess;
use crate::session::Session;
use ratatui::Frame;

pub use markup::markup_lines;
pub use theme::Palette;

/// Draw the UI.
pub fn draw<C: ContainerAccess>(f: &mut Frame<'_>, session: &mut Session<C>) {
    let palette = Palette::default();
    browser::draw_browser(f, session, &palette);
    if session.show_help() {
        help::draw_help(f, &palette);
    }
}
