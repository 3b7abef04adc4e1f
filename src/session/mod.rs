//! Interactive session.
//!
//! A [`Session`] owns the open container for its whole lifetime together with
//! the tree, the navigation state and the two panel texts. Input arrives
//! through [`Session::handle_key`]; inspections are deferred into a single
//! pending slot and advanced one chunk per [`Session::tick`], so the event
//! loop keeps redrawing and reading keys while a large dataset streams in.
//!
//! Each highlight or inspect dispatch bumps a generation counter. A pending
//! inspection tagged with an older generation is dropped instead of being
//! rendered over a newer selection.

use crate::config::Config;
use crate::container::{ContainerAccess, NodeKind, ROOT_PATH};
use crate::format::metadata_text;
use crate::inspect::{DatasetInspector, InspectionError, InspectionResult, InspectionTask, Step};
use crate::navigation::TreeView;
use crate::tree::TreeModel;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Title shown in the header bar.
pub const APP_TITLE: &str = "h5lens";

/// Data panel text shown after a highlight.
pub const INSPECT_PROMPT: &str = "Press i to look into data";

/// Rows moved by a page key.
const PAGE_ROWS: isize = 15;

/// Lines scrolled in the data panel per key.
const DATA_SCROLL_LINES: u16 = 5;

/// Where the session is in the highlight/inspect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is highlighted.
    Idle,
    /// A node is highlighted; the data panel shows the prompt.
    Highlighted,
    /// An inspection is pending.
    Inspecting,
    /// An inspection result is displayed.
    Displayed,
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep running.
    Continue,
    /// Leave the event loop.
    Quit,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    task: InspectionTask,
}

/// An open container and everything shown about it.
#[derive(Debug)]
pub struct Session<C: ContainerAccess> {
    container: C,
    model: TreeModel,
    view: TreeView,
    inspector: DatasetInspector,
    metadata: String,
    data: String,
    data_scroll: u16,
    title: String,
    subtitle: String,
    status: String,
    state: SessionState,
    show_help: bool,
    generation: u64,
    pending: Option<Pending>,
    pending_g: bool,
    highlighted: Option<String>,
}

impl<C: ContainerAccess> Session<C> {
    /// Build the tree of `container` and highlight the root.
    pub fn new(container: C, config: &Config) -> Self {
        let model = TreeModel::build(&container, ROOT_PATH);
        let view = TreeView::new(&model);

        let mut session = Self {
            container,
            model,
            view,
            inspector: DatasetInspector::new(config.inspector.clone()),
            metadata: String::new(),
            data: String::new(),
            data_scroll: 0,
            title: APP_TITLE.to_string(),
            subtitle: String::new(),
            status: "Ready".to_string(),
            state: SessionState::Idle,
            show_help: false,
            generation: 0,
            pending: None,
            pending_g: false,
            highlighted: None,
        };
        session.sync_highlight();
        session
    }

    /// Set the header subtitle.
    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) {
        self.subtitle = subtitle.into();
    }

    /// Header title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Header subtitle.
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Status line text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Metadata panel markup.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    /// Data panel markup.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Data panel scroll offset in lines.
    pub fn data_scroll(&self) -> u16 {
        self.data_scroll
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the help overlay is shown.
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// The structural tree.
    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    /// Navigation state.
    pub fn view(&self) -> &TreeView {
        &self.view
    }

    /// Mutable navigation state, for keeping the cursor in the viewport.
    pub fn view_mut(&mut self) -> &mut TreeView {
        &mut self.view
    }

    /// Path of the highlighted node.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if an inspection is waiting for ticks.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        let modifiers = match key.code {
            // Terminals disagree on whether SHIFT accompanies uppercase chars.
            KeyCode::Char(_) => key.modifiers - KeyModifiers::SHIFT,
            _ => key.modifiers,
        };

        if self.show_help {
            match (modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Control::Quit,
                (KeyModifiers::NONE, KeyCode::Char('?')) | (KeyModifiers::NONE, KeyCode::Esc) => {
                    self.show_help = false;
                },
                _ => {},
            }
            return Control::Continue;
        }

        let was_pending_g = std::mem::take(&mut self.pending_g);

        match (modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Control::Quit,
            (KeyModifiers::NONE, KeyCode::Char('?')) => self.show_help = true,
            (KeyModifiers::NONE, KeyCode::Char('i')) => self.request_inspect(),

            // Navigation
            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                self.view.cursor_up();
                self.sync_highlight();
            },
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                self.view.cursor_down();
                self.sync_highlight();
            },
            (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                self.view.collapse_current(&self.model);
                self.sync_highlight();
            },
            (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                self.view.expand_current(&self.model);
                self.sync_highlight();
            },
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                if was_pending_g {
                    self.view.goto_first();
                    self.sync_highlight();
                } else {
                    self.pending_g = true;
                }
            },
            (KeyModifiers::NONE, KeyCode::Char('G')) => {
                self.view.goto_last();
                self.sync_highlight();
            },
            (KeyModifiers::CONTROL, KeyCode::Char('f')) | (KeyModifiers::NONE, KeyCode::PageDown) => {
                self.view.page(PAGE_ROWS);
                self.sync_highlight();
            },
            (KeyModifiers::CONTROL, KeyCode::Char('b')) | (KeyModifiers::NONE, KeyCode::PageUp) => {
                self.view.page(-PAGE_ROWS);
                self.sync_highlight();
            },

            // Data panel scrolling
            (KeyModifiers::CONTROL, KeyCode::Char('d')) | (KeyModifiers::NONE, KeyCode::Char('J')) => {
                self.scroll_data_down();
            },
            (KeyModifiers::CONTROL, KeyCode::Char('u')) | (KeyModifiers::NONE, KeyCode::Char('K')) => {
                self.scroll_data_up();
            },

            _ => {},
        }
        Control::Continue
    }

    /// Advance the pending inspection by one chunk.
    ///
    /// Returns `true` when the panels changed.
    pub fn tick(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        if pending.generation != self.generation {
            tracing::debug!(
                "Dropping stale inspection of {} (generation {} != {})",
                pending.task.path(),
                pending.generation,
                self.generation
            );
            return false;
        }

        match pending.task.step(&self.container) {
            Step::Continue(task) => {
                let (done, total) = task.progress();
                self.status = format!("Inspecting {}... ({}/{} values)", task.path(), done, total);
                self.pending = Some(Pending {
                    generation: pending.generation,
                    task,
                });
            },
            Step::Done(result) => self.show_result(result),
        }
        true
    }

    /// Close the container and end the session.
    pub fn close(self) {
        tracing::info!("Closing session after generation {}", self.generation);
        drop(self.container);
    }

    fn sync_highlight(&mut self) {
        let Some(item) = self.view.current() else {
            self.state = SessionState::Idle;
            self.highlighted = None;
            return;
        };
        if self.highlighted.as_deref() == Some(item.path.as_str()) {
            return;
        }

        let path = item.path.clone();
        let kind = item.kind;

        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Cancelled inspection of {}", pending.task.path());
        }

        self.metadata = self.metadata_for(&path, kind);
        self.data = INSPECT_PROMPT.to_string();
        self.data_scroll = 0;
        self.state = SessionState::Highlighted;
        self.status = path.clone();
        self.highlighted = Some(path);
    }

    /// Attributes and shape are re-read on every highlight.
    fn metadata_for(&self, path: &str, kind: NodeKind) -> String {
        let (shape, dtype) = if kind == NodeKind::Dataset {
            match self.container.shape_dtype(path) {
                Ok((shape, dtype)) => (Some(shape), Some(dtype)),
                Err(e) => {
                    tracing::warn!("{}", e);
                    (None, None)
                },
            }
        } else {
            (None, None)
        };

        let (attributes, attr_error) = match self.container.attributes(path) {
            Ok(attributes) => (attributes, None),
            Err(e) => {
                tracing::warn!("{}", e);
                (Vec::new(), Some(e))
            },
        };

        let mut text = metadata_text(path, kind, shape.as_deref(), dtype.as_ref(), &attributes);
        if let Some(e) = attr_error {
            text.push_str(&format!("\n⚠️ _Error reading attributes_: `{}`\n", e));
        }
        text
    }

    fn request_inspect(&mut self) {
        let Some(node) = self.highlighted.as_deref().and_then(|p| self.model.find(p)) else {
            self.status = "Nothing selected".to_string();
            return;
        };
        let path = self.model.resolve(node).to_string();

        if !node.is_dataset() {
            self.data = InspectionResult::failed(&path, InspectionError::NotADataset).render();
            self.data_scroll = 0;
            self.status = format!("{} is not a dataset", path);
            return;
        }

        self.generation += 1;
        if let Some(previous) = self.pending.take() {
            tracing::debug!("Replacing pending inspection of {}", previous.task.path());
        }
        tracing::debug!("Dispatching inspection of {} (generation {})", path, self.generation);

        match self.inspector.start(&self.container, &path) {
            Step::Continue(task) => {
                self.pending = Some(Pending {
                    generation: self.generation,
                    task,
                });
                self.data = format!("Inspecting {}...", path);
                self.data_scroll = 0;
                self.state = SessionState::Inspecting;
                self.status = format!("Inspecting {}...", path);
            },
            Step::Done(result) => self.show_result(result),
        }
    }

    fn show_result(&mut self, result: InspectionResult) {
        self.status = if result.is_ok() {
            format!("Inspection of {} done", result.path)
        } else {
            format!("Inspection of {} failed", result.path)
        };
        self.data = result.render();
        self.data_scroll = 0;
        self.state = SessionState::Displayed;
    }

    fn scroll_data_down(&mut self) {
        let max = self.data.lines().count().saturating_sub(1) as u16;
        self.data_scroll = (self.data_scroll + DATA_SCROLL_LINES).min(max);
    }

    fn scroll_data_up(&mut self) {
        self.data_scroll = self.data_scroll.saturating_sub(DATA_SCROLL_LINES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectorConfig;
    use crate::container::{AttributeValue, DataChunk, Dtype, MemoryContainer, TextKind};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn press(session: &mut Session<MemoryContainer>, keys: &str) {
        for c in keys.chars() {
            assert_eq!(session.handle_key(key(c)), Control::Continue);
        }
    }

    fn run_pending(session: &mut Session<MemoryContainer>) {
        while session.has_pending() {
            session.tick();
        }
    }

    fn container() -> MemoryContainer {
        MemoryContainer::new()
            .dataset("/grp/ds", &[3], Dtype::Int(32), DataChunk::Int(vec![1, 2, 3]))
            .attr(
                "/grp/ds",
                "unit",
                AttributeValue::Text {
                    kind: TextKind::Str,
                    value: "m".to_string(),
                },
            )
            .dataset(
                "/grp/wide",
                &[6, 2],
                Dtype::Float(64),
                DataChunk::Float((0..12).map(f64::from).collect()),
            )
            .group("/empty")
    }

    fn session(chunk_elements: usize) -> Session<MemoryContainer> {
        let config = Config {
            inspector: InspectorConfig {
                chunk_elements,
                ..InspectorConfig::default()
            },
        };
        Session::new(container(), &config)
    }

    /// Highlight `path` by walking the tree with expand/down keys.
    fn goto(session: &mut Session<MemoryContainer>, path: &str) {
        session.handle_key(key('g'));
        session.handle_key(key('g'));
        for _ in 0..32 {
            if session.highlighted() == Some(path) {
                return;
            }
            session.handle_key(key('l'));
            session.handle_key(key('j'));
        }
        panic!("never reached {}", path);
    }

    #[test]
    fn test_starts_on_root() {
        let session = session(1024);
        assert_eq!(session.highlighted(), Some("/"));
        assert_eq!(session.state(), SessionState::Highlighted);
        assert_eq!(session.data(), INSPECT_PROMPT);
        assert!(session.metadata().starts_with("# /\n- HDF: Group\n"));
    }

    #[test]
    fn test_highlight_shows_attributes_then_inspect_shows_statistics() {
        let mut session = session(1024);
        goto(&mut session, "/grp/ds");

        assert!(session.metadata().contains("| unit | str | m |"));
        assert!(session.metadata().contains("- Shape: (3,)\n- Type: int32\n"));
        assert_eq!(session.state(), SessionState::Highlighted);

        press(&mut session, "i");
        assert_eq!(session.state(), SessionState::Inspecting);
        run_pending(&mut session);

        assert_eq!(session.state(), SessionState::Displayed);
        assert!(session.data().contains(" - min: 1\n"));
        assert!(session.data().contains(" - max: 3\n"));
        assert!(session.data().contains(" - mean: 2.0\n"));
    }

    #[test]
    fn test_empty_group_is_rejected_on_inspect() {
        let mut session = session(1024);
        session.handle_key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(session.highlighted(), Some("/empty"));

        let before = session.generation();
        press(&mut session, "i");

        assert_eq!(session.data(), "_Not a dataset_");
        assert_eq!(session.state(), SessionState::Highlighted);
        assert!(!session.has_pending());
        assert_eq!(session.generation(), before);
    }

    #[test]
    fn test_navigation_cancels_pending_inspection() {
        let mut session = session(2);
        goto(&mut session, "/grp/wide");
        press(&mut session, "i");
        assert!(session.tick());
        assert!(session.has_pending());

        press(&mut session, "k");
        assert!(!session.has_pending());
        assert_eq!(session.state(), SessionState::Highlighted);
        assert_eq!(session.data(), INSPECT_PROMPT);
        assert!(!session.tick());
    }

    #[test]
    fn test_repeated_inspect_replaces_pending() {
        let mut session = session(2);
        goto(&mut session, "/grp/wide");
        press(&mut session, "i");
        session.tick();
        let first = session.generation();

        press(&mut session, "i");
        assert!(session.generation() > first);
        assert_eq!(session.view().current().map(|i| i.path.as_str()), Some("/grp/wide"));

        // A fresh task needs all six rows again.
        let mut ticks = 0;
        while session.has_pending() {
            session.tick();
            ticks += 1;
        }
        assert_eq!(ticks, 6);
        assert!(session.data().contains(" - max: 11.0\n"));
    }

    #[test]
    fn test_stale_task_is_dropped_on_tick() {
        let mut session = session(2);
        goto(&mut session, "/grp/wide");
        press(&mut session, "i");

        session.generation += 1;
        assert!(!session.tick());
        assert!(!session.has_pending());
        assert_eq!(session.state(), SessionState::Inspecting);
    }

    #[test]
    fn test_help_overlay_keeps_navigation() {
        let mut session = session(1024);
        goto(&mut session, "/grp/ds");

        press(&mut session, "?");
        assert!(session.show_help());
        press(&mut session, "jjk");
        assert_eq!(session.highlighted(), Some("/grp/ds"));

        session.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!session.show_help());
    }

    #[test]
    fn test_quit() {
        let mut session = session(1024);
        assert_eq!(session.handle_key(key('q')), Control::Quit);
        session.close();
    }

    #[test]
    fn test_read_failure_is_shown_inline() {
        let config = Config::default();
        let mut session = Session::new(container().break_data("/grp/ds"), &config);
        goto(&mut session, "/grp/ds");
        press(&mut session, "i");
        run_pending(&mut session);

        assert!(session.data().starts_with("⚠️ _Error reading dataset_"));
        assert_eq!(session.handle_key(key('j')), Control::Continue);
    }

    #[test]
    fn test_broken_metadata_shows_placeholders() {
        let config = Config::default();
        let mut session = Session::new(container().break_metadata("/grp/ds"), &config);
        goto(&mut session, "/grp/ds");
        assert!(session.metadata().contains("- Shape: ?\n- Type: ?\n"));
    }

    #[test]
    fn test_data_scroll_is_clamped() {
        let mut session = session(1024);
        goto(&mut session, "/grp/ds");
        press(&mut session, "i");
        run_pending(&mut session);

        for _ in 0..20 {
            press(&mut session, "J");
        }
        let lines = session.data().lines().count() as u16;
        assert_eq!(session.data_scroll(), lines - 1);
        press(&mut session, "K");
        assert_eq!(session.data_scroll(), lines - 6);
    }
}
