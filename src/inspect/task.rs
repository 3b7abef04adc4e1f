//! Resumable dataset inspection.
//!
//! An [`InspectionTask`] reads one chunk per [`InspectionTask::step`] call, so
//! an event loop can interleave input handling with a long read and drop the
//! task at any point.

use super::preview::PreviewBuffer;
use super::stats::StatsFold;
use super::{InspectionError, InspectionResult};
use crate::config::{InspectorConfig, ReadStrategy};
use crate::container::{element_count, ContainerAccess, DataChunk, Dtype, Hyperslab, NodeKind};
use crate::format::shape_tuple;
use std::ops::Range;

/// Divisor applied to the chunk budget for string datasets.
const TEXT_CHUNK_DIVISOR: usize = 64;

/// Outcome of starting or stepping an inspection.
#[derive(Debug)]
pub enum Step {
    /// More chunks remain.
    Continue(InspectionTask),
    /// The inspection finished, successfully or not.
    Done(InspectionResult),
}

/// How the remaining values get read.
///
/// `Slabs` walks `axis` in runs of `step` indices; every axis before it is
/// pinned to the `outer`-th index in row-major order and every axis after it
/// is read whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadPlan {
    Whole,
    Slabs {
        axis: usize,
        step: usize,
        outer: usize,
        pos: usize,
    },
}

/// An inspection in progress.
#[derive(Debug)]
pub struct InspectionTask {
    path: String,
    shape: Vec<usize>,
    dtype: Dtype,
    total: usize,
    done: usize,
    plan: ReadPlan,
    stats: Option<StatsFold>,
    preview: PreviewBuffer,
    reads: usize,
}

impl InspectionTask {
    /// Validate `path` and plan the reads.
    ///
    /// Fails fast (as a finished [`Step::Done`] carrying an error) when the
    /// node is missing, not a dataset, has an unreadable or unsupported
    /// element type, or holds more values than can be addressed. Empty
    /// datasets finish here without any read.
    pub fn start<C: ContainerAccess + ?Sized>(container: &C, path: &str, config: &InspectorConfig) -> Step {
        match container.kind(path) {
            Ok(NodeKind::Dataset) => {},
            Ok(_) => return Step::Done(InspectionResult::failed(path, InspectionError::NotADataset)),
            Err(e) => {
                return Step::Done(InspectionResult::failed(path, InspectionError::Failed(e.to_string())));
            },
        }

        let (shape, dtype) = match container.shape_dtype(path) {
            Ok(meta) => meta,
            Err(e) => {
                return Step::Done(InspectionResult::failed(path, InspectionError::Failed(e.to_string())));
            },
        };

        if let Dtype::Other(name) = &dtype {
            let message = format!("unsupported dtype {}", name);
            return Step::Done(rejected(path, shape, dtype, message));
        }
        let Some(total) = element_count(&shape) else {
            let message = format!("dataset too large: shape {}", shape_tuple(&shape));
            return Step::Done(rejected(path, shape, dtype, message));
        };

        let plan = if total == 0 {
            ReadPlan::Whole
        } else {
            plan_reads(&shape, &dtype, config)
        };
        tracing::debug!("Inspecting {} with {:?}", path, plan);

        let task = InspectionTask {
            path: path.to_string(),
            preview: PreviewBuffer::new(&shape, total, &dtype, config.preview_threshold, config.edge_items),
            stats: dtype.is_numeric().then(StatsFold::new),
            shape,
            dtype,
            total,
            done: 0,
            plan,
            reads: 0,
        };

        if total == 0 {
            return Step::Done(task.finish());
        }
        Step::Continue(task)
    }

    /// Path being inspected.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Values read so far and values in the dataset.
    pub fn progress(&self) -> (usize, usize) {
        (self.done, self.total)
    }

    /// Read and fold the next chunk.
    pub fn step<C: ContainerAccess + ?Sized>(mut self, container: &C) -> Step {
        let (read, expected, remaining) = match self.plan {
            ReadPlan::Whole => (container.read_dataset(&self.path), self.total, None),
            ReadPlan::Slabs { axis, step, outer, pos } => {
                let along = self.shape[axis];
                let stop = (pos + step).min(along);
                let outer_count: usize = self.shape[..axis].iter().product();
                let remaining = if stop < along {
                    Some(ReadPlan::Slabs { axis, step, outer, pos: stop })
                } else if outer + 1 < outer_count {
                    Some(ReadPlan::Slabs { axis, step, outer: outer + 1, pos: 0 })
                } else {
                    None
                };
                let slab = slab_at(&self.shape, axis, outer, pos..stop);
                (container.read_slab(&self.path, &slab), slab.len(), remaining)
            },
        };
        self.reads += 1;

        let chunk = match read {
            Ok(chunk) => chunk,
            Err(e) => return Step::Done(self.fail(e.to_string())),
        };
        if chunk.len() != expected {
            let message = format!("expected {} values, got {}", expected, chunk.len());
            return Step::Done(self.fail(message));
        }
        if !chunk_matches(&self.dtype, &chunk) {
            let message = format!("read returned values that do not match dtype {}", self.dtype);
            return Step::Done(self.fail(message));
        }

        if let Some(stats) = self.stats.as_mut() {
            if let Err(message) = stats.fold(&chunk) {
                return Step::Done(self.fail(message));
            }
        }
        self.preview.push(&chunk);
        self.done += chunk.len();

        match remaining {
            Some(plan) => {
                self.plan = plan;
                Step::Continue(self)
            },
            None => Step::Done(self.finish()),
        }
    }

    fn fail(self, message: String) -> InspectionResult {
        tracing::warn!("Inspection of {} failed: {}", self.path, message);
        rejected(&self.path, self.shape, self.dtype, message)
    }

    fn finish(self) -> InspectionResult {
        let preview = match self.preview.finish() {
            Ok(preview) => preview,
            Err(message) => return self.fail(message),
        };
        tracing::info!("Inspected {} in {} reads", self.path, self.reads);

        InspectionResult {
            statistics: self.stats.as_ref().and_then(|s| s.finish(&self.dtype)),
            path: self.path,
            shape: Some(self.shape),
            dtype: Some(self.dtype),
            preview,
            error: None,
        }
    }
}

fn rejected(path: &str, shape: Vec<usize>, dtype: Dtype, message: String) -> InspectionResult {
    let mut result = InspectionResult::failed(path, InspectionError::Failed(message));
    result.shape = Some(shape);
    result.dtype = Some(dtype);
    result
}

/// Callers check that `shape` holds a nonzero, addressable number of values.
fn plan_reads(shape: &[usize], dtype: &Dtype, config: &InspectorConfig) -> ReadPlan {
    if shape.is_empty() || config.read_strategy == ReadStrategy::Whole {
        return ReadPlan::Whole;
    }

    let budget = if dtype.is_text() {
        (config.chunk_elements / TEXT_CHUNK_DIVISOR).max(1)
    } else {
        config.chunk_elements
    };

    // Split along the outermost axis whose trailing block fits the budget.
    let mut axis = 0;
    while axis + 1 < shape.len() && shape[axis + 1..].iter().product::<usize>() > budget {
        axis += 1;
    }
    let inner: usize = shape[axis + 1..].iter().product();

    ReadPlan::Slabs {
        axis,
        step: (budget / inner.max(1)).max(1),
        outer: 0,
        pos: 0,
    }
}

/// Slab over `range` along `axis`, at the `outer`-th row-major index of the
/// axes before it.
fn slab_at(shape: &[usize], axis: usize, outer: usize, range: Range<usize>) -> Hyperslab {
    let mut start = vec![0; shape.len()];
    let mut count = shape.to_vec();
    let mut rest = outer;
    for a in (0..axis).rev() {
        start[a] = rest % shape[a];
        count[a] = 1;
        rest /= shape[a];
    }
    start[axis] = range.start;
    count[axis] = range.end - range.start;
    Hyperslab { start, count }
}

fn chunk_matches(dtype: &Dtype, chunk: &DataChunk) -> bool {
    matches!(
        (dtype, chunk),
        (Dtype::Int(_), DataChunk::Int(_))
            | (Dtype::UInt(_), DataChunk::UInt(_))
            | (Dtype::Float(_), DataChunk::Float(_))
            | (Dtype::FixedBytes(_) | Dtype::VarString, DataChunk::Text(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_elements: usize) -> InspectorConfig {
        InspectorConfig {
            chunk_elements,
            ..InspectorConfig::default()
        }
    }

    fn slabs(axis: usize, step: usize) -> ReadPlan {
        ReadPlan::Slabs {
            axis,
            step,
            outer: 0,
            pos: 0,
        }
    }

    #[test]
    fn test_plan_rows_by_budget() {
        let plan = plan_reads(&[100, 10], &Dtype::Float(64), &config(25));
        assert_eq!(plan, slabs(0, 2));
    }

    #[test]
    fn test_plan_splits_rows_wider_than_budget() {
        assert_eq!(plan_reads(&[4, 1000], &Dtype::Float(64), &config(10)), slabs(1, 10));
        assert_eq!(plan_reads(&[1, 100_000], &Dtype::Int(32), &config(256)), slabs(1, 256));
        assert_eq!(plan_reads(&[2, 3, 1000], &Dtype::Int(8), &config(10)), slabs(2, 10));
        assert_eq!(plan_reads(&[2, 3, 4], &Dtype::Int(8), &config(5)), slabs(1, 1));
    }

    #[test]
    fn test_plan_scalar_and_whole() {
        assert_eq!(plan_reads(&[], &Dtype::Int(32), &config(10)), ReadPlan::Whole);

        let whole = InspectorConfig {
            read_strategy: ReadStrategy::Whole,
            ..InspectorConfig::default()
        };
        assert_eq!(plan_reads(&[10], &Dtype::Int(32), &whole), ReadPlan::Whole);
    }

    #[test]
    fn test_plan_shrinks_text_budget() {
        let plan = plan_reads(&[1000], &Dtype::VarString, &config(640));
        assert_eq!(plan, slabs(0, 10));
    }

    #[test]
    fn test_slab_at_pins_outer_axes() {
        let slab = slab_at(&[2, 3, 1000], 2, 4, 10..20);
        assert_eq!(slab.start, vec![1, 1, 10]);
        assert_eq!(slab.count, vec![1, 1, 10]);

        let rows = slab_at(&[5, 4], 0, 0, 2..5);
        assert_eq!(rows, Hyperslab::rows(&[5, 4], 2..5));
    }

    #[test]
    fn test_chunk_matches() {
        assert!(chunk_matches(&Dtype::Int(16), &DataChunk::Int(vec![])));
        assert!(chunk_matches(&Dtype::FixedBytes(4), &DataChunk::Text(vec![])));
        assert!(!chunk_matches(&Dtype::Float(32), &DataChunk::Int(vec![])));
    }
}
