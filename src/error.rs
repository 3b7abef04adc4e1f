//! Error types for h5lens.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Only [`H5LensError::Open`] is fatal; every other variant is caught at the
//! component boundary and rendered into a panel.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for h5lens operations.
pub type Result<T> = std::result::Result<T, H5LensError>;

/// Errors that can occur in h5lens.
#[derive(Debug, Error)]
pub enum H5LensError {
    /// The container could not be opened.
    #[error("Failed to open {}: {message}", path.display())]
    Open {
        /// Path that was passed on the command line.
        path: PathBuf,
        /// Backend message.
        message: String,
    },

    /// Reading metadata or data of a single node failed.
    #[error("Failed to read {path}: {message}")]
    Read {
        /// Container path of the node.
        path: String,
        /// Backend message.
        message: String,
    },

    /// An inspection was requested on something other than a dataset.
    #[error("Not a dataset: {path}")]
    NotADataset {
        /// Container path of the node.
        path: String,
    },

    /// Node not found in the container.
    #[error("Node not found: {path}")]
    NodeNotFound {
        /// Container path that did not resolve.
        path: String,
    },

    /// A value could not be rendered.
    #[error("Format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl H5LensError {
    /// Create an Open error.
    pub fn open(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a Read error.
    pub fn read(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a NotADataset error.
    pub fn not_a_dataset(path: impl Into<String>) -> Self {
        Self::NotADataset { path: path.into() }
    }

    /// Create a NodeNotFound error.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }
}
