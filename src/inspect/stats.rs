//! Streaming min/max/mean over dataset chunks.

use crate::container::{DataChunk, Dtype};
use std::fmt;

/// A minimum or maximum, kept in the dataset's own number class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
}

impl StatValue {
    /// Widen to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            StatValue::Int(v) => v as f64,
            StatValue::UInt(v) => v as f64,
            StatValue::Float32(v) => v as f64,
            StatValue::Float64(v) => v,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(v) => write!(f, "{}", v),
            StatValue::UInt(v) => write!(f, "{}", v),
            StatValue::Float32(v) => write!(f, "{:?}", v),
            StatValue::Float64(v) => write!(f, "{:?}", v),
        }
    }
}

/// Summary statistics of a numeric dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Smallest finite value.
    pub min: StatValue,
    /// Largest finite value.
    pub max: StatValue,
    /// Mean of the finite values.
    pub mean: f64,
    /// Number of values that entered the statistics.
    pub valid: usize,
    /// Number of values seen.
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
enum Extremes {
    Empty,
    Int(i64, i64),
    UInt(u64, u64),
    Float(f64, f64),
}

/// Incremental reduction folded one chunk at a time.
///
/// NaN and infinities are counted in `total` but skipped otherwise.
#[derive(Debug, Clone)]
pub(crate) struct StatsFold {
    extremes: Extremes,
    sum: f64,
    valid: usize,
    total: usize,
}

impl StatsFold {
    pub(crate) fn new() -> Self {
        Self {
            extremes: Extremes::Empty,
            sum: 0.0,
            valid: 0,
            total: 0,
        }
    }

    /// Fold one chunk; fails if its number class differs from earlier chunks.
    pub(crate) fn fold(&mut self, chunk: &DataChunk) -> Result<(), String> {
        match chunk {
            DataChunk::Int(values) => {
                for &v in values {
                    self.extremes = match self.extremes {
                        Extremes::Empty => Extremes::Int(v, v),
                        Extremes::Int(lo, hi) => Extremes::Int(lo.min(v), hi.max(v)),
                        _ => return Err(mixed()),
                    };
                    self.sum += v as f64;
                }
                self.valid += values.len();
                self.total += values.len();
            },
            DataChunk::UInt(values) => {
                for &v in values {
                    self.extremes = match self.extremes {
                        Extremes::Empty => Extremes::UInt(v, v),
                        Extremes::UInt(lo, hi) => Extremes::UInt(lo.min(v), hi.max(v)),
                        _ => return Err(mixed()),
                    };
                    self.sum += v as f64;
                }
                self.valid += values.len();
                self.total += values.len();
            },
            DataChunk::Float(values) => {
                for &v in values {
                    self.total += 1;
                    if !v.is_finite() {
                        continue;
                    }
                    self.extremes = match self.extremes {
                        Extremes::Empty => Extremes::Float(v, v),
                        Extremes::Float(lo, hi) => Extremes::Float(lo.min(v), hi.max(v)),
                        _ => return Err(mixed()),
                    };
                    self.sum += v;
                    self.valid += 1;
                }
            },
            DataChunk::Text(values) => {
                return Err(format!("cannot compute statistics over {} strings", values.len()));
            },
        }
        Ok(())
    }

    /// Number of values seen so far.
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    /// Final statistics; `None` when no finite value was seen.
    pub(crate) fn finish(&self, dtype: &Dtype) -> Option<Statistics> {
        if self.valid == 0 {
            return None;
        }
        let (min, max) = match self.extremes {
            Extremes::Empty => return None,
            Extremes::Int(lo, hi) => (StatValue::Int(lo), StatValue::Int(hi)),
            Extremes::UInt(lo, hi) => (StatValue::UInt(lo), StatValue::UInt(hi)),
            Extremes::Float(lo, hi) if *dtype == Dtype::Float(32) => {
                (StatValue::Float32(lo as f32), StatValue::Float32(hi as f32))
            },
            Extremes::Float(lo, hi) => (StatValue::Float64(lo), StatValue::Float64(hi)),
        };
        Some(Statistics {
            min,
            max,
            mean: self.sum / self.valid as f64,
            valid: self.valid,
            total: self.total,
        })
    }
}

fn mixed() -> String {
    "chunks returned mixed number types".to_string()
}
