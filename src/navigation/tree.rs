use crate::container::NodeKind;
use crate::tree::{TreeModel, TreeNode};
use std::collections::HashSet;

/// A single row in the tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    /// Display label.
    pub label: String,
    /// Container path of the node.
    pub path: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Nesting level.
    pub level: usize,
    /// Whether this node is expanded.
    pub expanded: bool,
    /// Whether this node can be expanded.
    pub expandable: bool,
}

/// Tree navigation state.
///
/// The view maintains a flat list of visible rows. When nodes are
/// expanded or collapsed, the list is rebuilt from the model.
#[derive(Debug, Default)]
pub struct TreeView {
    /// All tree items in display order (only visible items).
    items: Vec<TreeItem>,
    /// Cursor position (index into items).
    cursor: usize,
    /// Set of expanded node paths.
    expanded_paths: HashSet<String>,
    /// Scroll offset for the tree view.
    scroll_offset: usize,
}

impl TreeView {
    /// Create a view over `model` with the root expanded.
    pub fn new(model: &TreeModel) -> Self {
        let mut view = Self::default();
        view.expanded_paths.insert(model.root().path.clone());
        view.rebuild(model);
        view
    }

    fn rebuild(&mut self, model: &TreeModel) {
        self.items.clear();
        self.add_visible_recursive(model.root(), 0);
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
    }

    fn add_visible_recursive(&mut self, node: &TreeNode, level: usize) {
        let is_expanded = self.expanded_paths.contains(&node.path);

        self.items.push(TreeItem {
            label: node.label.clone(),
            path: node.path.clone(),
            kind: node.kind,
            level,
            expanded: is_expanded,
            expandable: node.is_expandable(),
        });

        if is_expanded {
            for child in &node.children {
                self.add_visible_recursive(child, level + 1);
            }
        }
    }

    /// Move the cursor up; returns whether it moved.
    pub fn cursor_up(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            return true;
        }
        false
    }

    /// Move the cursor down; returns whether it moved.
    pub fn cursor_down(&mut self) -> bool {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
            return true;
        }
        false
    }

    /// Move the cursor by up to `rows`; returns whether it moved.
    pub fn page(&mut self, rows: isize) -> bool {
        let before = self.cursor;
        let last = self.items.len().saturating_sub(1);
        self.cursor = if rows < 0 {
            self.cursor.saturating_sub(rows.unsigned_abs())
        } else {
            (self.cursor + rows as usize).min(last)
        };
        before != self.cursor
    }

    /// Go to the first item; returns whether the cursor moved.
    pub fn goto_first(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    /// Go to the last visible item; returns whether the cursor moved.
    pub fn goto_last(&mut self) -> bool {
        let last = self.items.len().saturating_sub(1);
        let moved = self.cursor != last;
        self.cursor = last;
        moved
    }

    /// Expand the node at the cursor.
    pub fn expand_current(&mut self, model: &TreeModel) {
        if let Some(item) = self.items.get(self.cursor) {
            if item.expandable && !item.expanded {
                self.expanded_paths.insert(item.path.clone());
                self.rebuild(model);
            }
        }
    }

    /// Collapse the node at the cursor.
    pub fn collapse_current(&mut self, model: &TreeModel) {
        if let Some(item) = self.items.get(self.cursor) {
            if item.expanded {
                self.expanded_paths.remove(&item.path.clone());
                self.rebuild(model);
            }
        }
    }

    /// Adjust scroll to keep the cursor visible.
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        }

        if self.cursor >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.saturating_sub(viewport_height - 1);
        }
    }

    /// Get the current scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Get all currently visible items.
    pub fn visible_items(&self) -> &[TreeItem] {
        &self.items
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the item under the cursor.
    pub fn current(&self) -> Option<&TreeItem> {
        self.items.get(self.cursor)
    }

    /// Check if the node at `path` is expanded.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded_paths.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DataChunk, Dtype, MemoryContainer};

    fn model() -> TreeModel {
        let container = MemoryContainer::new()
            .dataset("/a/x", &[1], Dtype::Int(8), DataChunk::Int(vec![1]))
            .dataset("/a/y", &[1], Dtype::Int(8), DataChunk::Int(vec![2]))
            .group("/b");
        TreeModel::build(&container, "/")
    }

    fn paths(view: &TreeView) -> Vec<&str> {
        view.visible_items().iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_root_expanded_on_start() {
        let view = TreeView::new(&model());
        assert_eq!(paths(&view), vec!["/", "/a", "/b"]);
        assert_eq!(view.current().unwrap().path, "/");
        assert!(view.is_expanded("/"));
    }

    #[test]
    fn test_expand_and_collapse() {
        let model = model();
        let mut view = TreeView::new(&model);

        view.cursor_down();
        view.expand_current(&model);
        assert_eq!(paths(&view), vec!["/", "/a", "/a/x", "/a/y", "/b"]);
        assert_eq!(view.visible_items()[2].level, 2);

        view.collapse_current(&model);
        assert_eq!(paths(&view), vec!["/", "/a", "/b"]);
    }

    #[test]
    fn test_datasets_do_not_expand() {
        let model = model();
        let mut view = TreeView::new(&model);
        view.cursor_down();
        view.expand_current(&model);
        view.cursor_down();
        assert_eq!(view.current().unwrap().path, "/a/x");

        view.expand_current(&model);
        assert_eq!(view.visible_items().len(), 5);
    }

    #[test]
    fn test_empty_group_expands_to_nothing() {
        let model = model();
        let mut view = TreeView::new(&model);
        view.goto_last();
        assert_eq!(view.current().unwrap().path, "/b");
        assert!(view.current().unwrap().expandable);

        view.expand_current(&model);
        assert!(view.is_expanded("/b"));
        assert_eq!(view.visible_items().len(), 3);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut view = TreeView::new(&model());
        assert!(!view.cursor_up());
        assert!(view.goto_last());
        assert!(!view.cursor_down());
        assert!(view.page(-10));
        assert_eq!(view.cursor(), 0);
        assert!(view.page(10));
        assert_eq!(view.cursor(), 2);
    }

    #[test]
    fn test_collapse_above_cursor_clamps() {
        let model = model();
        let mut view = TreeView::new(&model);
        view.goto_first();
        view.collapse_current(&model);
        assert_eq!(paths(&view), vec!["/"]);
        assert_eq!(view.cursor(), 0);
    }

    #[test]
    fn test_adjust_scroll_keeps_cursor_visible() {
        let mut view = TreeView::new(&model());
        view.goto_last();
        view.adjust_scroll(2);
        assert_eq!(view.scroll_offset(), 1);
        view.goto_first();
        view.adjust_scroll(2);
        assert_eq!(view.scroll_offset(), 0);
    }
}
