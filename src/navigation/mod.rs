//! Tree navigation.
//!
//! This module provides cursor movement and expand/collapse state over the
//! structural tree built from the container.

mod tree;

pub use tree::{TreeItem, TreeView};
