//! Dataset inspection.
//!
//! This module computes summary statistics and a bounded preview of a dataset
//! in a single streaming pass. Reads go through [`task::InspectionTask`], which
//! pulls at most one chunk at a time, so peak memory depends on the chunk
//! budget rather than on the dataset size.
//!
//! Failures never escape as errors: they are carried in
//! [`InspectionResult::error`] and rendered into the data panel.

mod preview;
mod stats;
pub mod task;

pub use stats::{StatValue, Statistics};
pub use task::{InspectionTask, Step};

use crate::config::InspectorConfig;
use crate::container::{element_count, ContainerAccess, Dtype};
use std::fmt;

/// Why an inspection produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionError {
    /// The node is a group or something else without contents.
    NotADataset,
    /// Reading or reducing the data failed.
    Failed(String),
}

impl fmt::Display for InspectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionError::NotADataset => f.write_str("not a dataset"),
            InspectionError::Failed(message) => f.write_str(message),
        }
    }
}

/// The outcome of inspecting one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionResult {
    /// Container path that was inspected.
    pub path: String,
    /// Shape, when it could be read.
    pub shape: Option<Vec<usize>>,
    /// Element type, when it could be read.
    pub dtype: Option<Dtype>,
    /// Statistics; present only for numeric dtypes with at least one finite value.
    pub statistics: Option<Statistics>,
    /// Bounded text preview.
    pub preview: String,
    /// Set when the inspection failed.
    pub error: Option<InspectionError>,
}

impl InspectionResult {
    pub(crate) fn failed(path: &str, error: InspectionError) -> Self {
        Self {
            path: path.to_string(),
            shape: None,
            dtype: None,
            statistics: None,
            preview: String::new(),
            error: Some(error),
        }
    }

    /// Check if the inspection succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Render the data panel markup.
    pub fn render(&self) -> String {
        match &self.error {
            Some(InspectionError::NotADataset) => return "_Not a dataset_".to_string(),
            Some(InspectionError::Failed(message)) => {
                return format!("⚠️ _Error reading dataset_: `{}`", message);
            },
            None => {},
        }

        let mut text = String::from("# Data Preview\n## Statistics\n");
        match (&self.statistics, &self.dtype) {
            (Some(stats), _) => {
                text.push_str(&format!(" - min: {}\n", stats.min));
                text.push_str(&format!(" - max: {}\n", stats.max));
                text.push_str(&format!(" - mean: {:?}\n", stats.mean));
                if stats.valid < stats.total {
                    text.push_str(&format!(" - valid: {} / {}\n", stats.valid, stats.total));
                }
            },
            (None, Some(dtype)) if dtype.is_numeric() => {
                if self.shape.as_deref().and_then(element_count) == Some(0) {
                    text.push_str(" - statistics undefined (empty dataset)\n");
                } else {
                    text.push_str(" - statistics undefined (no finite values)\n");
                }
            },
            (None, Some(dtype)) => {
                text.push_str(&format!(" - not available for {}\n", dtype));
            },
            (None, None) => text.push_str(" - not available\n"),
        }
        text.push_str("## Data\n");
        text.push_str(&self.preview);
        text
    }
}

/// Inspects datasets with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct DatasetInspector {
    config: InspectorConfig,
}

impl DatasetInspector {
    /// Create an inspector.
    pub fn new(config: InspectorConfig) -> Self {
        Self { config }
    }

    /// Start a resumable inspection of `path`.
    pub fn start<C: ContainerAccess + ?Sized>(&self, container: &C, path: &str) -> Step {
        InspectionTask::start(container, path, &self.config)
    }

    /// Inspect `path` to completion.
    pub fn inspect<C: ContainerAccess + ?Sized>(&self, container: &C, path: &str) -> InspectionResult {
        let mut step = self.start(container, path);
        loop {
            match step {
                Step::Continue(task) => step = task.step(container),
                Step::Done(result) => return result,
            }
        }
    }
}
