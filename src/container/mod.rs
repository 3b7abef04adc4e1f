//! Container access.
//!
//! This module defines the read-only view h5lens needs of a hierarchical
//! container (groups, datasets, attributes) and the value types that cross
//! that boundary. The HDF5 backend lives in [`h5file`]; [`memory`] provides an
//! in-memory container built in code.

pub mod h5file;
pub mod memory;

use crate::error::Result;
use crate::format::clip_text;
use std::fmt;
use std::ops::Range;

pub use h5file::Hdf5Container;
pub use memory::MemoryContainer;

/// Path of the root group.
pub const ROOT_PATH: &str = "/";

/// Kind of a node in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A group holding other groups and datasets.
    Group,
    /// A typed, shaped array.
    Dataset,
    /// Anything else the container may hold (committed types, dangling links).
    Unknown,
}

impl NodeKind {
    /// Get the kind name shown in labels and panels.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Dataset => "Dataset",
            NodeKind::Unknown => "Unknown",
        }
    }
}

/// Element type of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dtype {
    /// Signed integer with the given bit width.
    Int(u8),
    /// Unsigned integer with the given bit width.
    UInt(u8),
    /// Floating point with the given bit width.
    Float(u8),
    /// Fixed-length byte string.
    FixedBytes(usize),
    /// Variable-length string.
    VarString,
    /// Unsupported element type.
    Other(String),
}

impl Dtype {
    /// Check if statistics can be computed over this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Dtype::Int(_) | Dtype::UInt(_) | Dtype::Float(_))
    }

    /// Check if values of this type are strings.
    pub fn is_text(&self) -> bool {
        matches!(self, Dtype::FixedBytes(_) | Dtype::VarString)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Int(bits) => write!(f, "int{}", bits),
            Dtype::UInt(bits) => write!(f, "uint{}", bits),
            Dtype::Float(bits) => write!(f, "float{}", bits),
            Dtype::FixedBytes(len) => write!(f, "|S{}", len),
            Dtype::VarString => f.write_str("str"),
            Dtype::Other(name) => f.write_str(name),
        }
    }
}

/// A scalar numeric attribute value, tagged with its stored width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer.
    Int {
        /// Stored bit width.
        bits: u8,
        /// Value widened to 64 bits.
        value: i64,
    },
    /// Unsigned integer.
    UInt {
        /// Stored bit width.
        bits: u8,
        /// Value widened to 64 bits.
        value: u64,
    },
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
}

impl Number {
    /// Get the numpy-style kind name (`int32`, `float64`, ...).
    pub fn kind_name(&self) -> String {
        match self {
            Number::Int { bits, .. } => format!("int{}", bits),
            Number::UInt { bits, .. } => format!("uint{}", bits),
            Number::Float32(_) => "float32".to_string(),
            Number::Float64(_) => "float64".to_string(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the trailing `.0` on whole floats.
        match self {
            Number::Int { value, .. } => write!(f, "{}", value),
            Number::UInt { value, .. } => write!(f, "{}", value),
            Number::Float32(v) => write!(f, "{:?}", v),
            Number::Float64(v) => write!(f, "{:?}", v),
        }
    }
}

/// Flavour of a scalar text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Variable-length string.
    Str,
    /// Fixed-length byte string.
    Bytes,
}

impl TextKind {
    /// Get the kind name shown in the attribute table.
    pub fn name(self) -> &'static str {
        match self {
            TextKind::Str => "str",
            TextKind::Bytes => "bytes_",
        }
    }
}

/// Flat values of an array attribute, in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// Signed integers.
    Int(Vec<i64>),
    /// Unsigned integers.
    UInt(Vec<u64>),
    /// Single precision floats.
    Float32(Vec<f32>),
    /// Double precision floats.
    Float64(Vec<f64>),
    /// Strings.
    Text(Vec<String>),
}

impl ArrayValues {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Int(v) => v.len(),
            ArrayValues::UInt(v) => v.len(),
            ArrayValues::Float32(v) => v.len(),
            ArrayValues::Float64(v) => v.len(),
            ArrayValues::Text(v) => v.len(),
        }
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render every value the way it appears inside an array.
    ///
    /// Strings are clipped to [`MAX_VALUE_WIDTH`](crate::format::MAX_VALUE_WIDTH) columns.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            ArrayValues::Int(v) => v.iter().map(|x| x.to_string()).collect(),
            ArrayValues::UInt(v) => v.iter().map(|x| x.to_string()).collect(),
            ArrayValues::Float32(v) => v.iter().map(|x| format!("{:?}", x)).collect(),
            ArrayValues::Float64(v) => v.iter().map(|x| format!("{:?}", x)).collect(),
            ArrayValues::Text(v) => v.iter().map(|x| format!("'{}'", clip_text(x))).collect(),
        }
    }
}

/// A key/value metadata entry attached to a group or dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Scalar number.
    Scalar(Number),
    /// Scalar string or byte string.
    Text {
        /// String flavour.
        kind: TextKind,
        /// Decoded contents.
        value: String,
    },
    /// N-dimensional array.
    Array {
        /// Array shape.
        shape: Vec<usize>,
        /// Flat values.
        values: ArrayValues,
    },
    /// A value h5lens cannot decode; `kind` names its stored type.
    Unrecognized {
        /// Type name for the table.
        kind: String,
    },
}

/// A run of dataset values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum DataChunk {
    /// Signed integers of any width.
    Int(Vec<i64>),
    /// Unsigned integers of any width.
    UInt(Vec<u64>),
    /// Floats of any width.
    Float(Vec<f64>),
    /// Strings.
    Text(Vec<String>),
}

impl DataChunk {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            DataChunk::Int(v) => v.len(),
            DataChunk::UInt(v) => v.len(),
            DataChunk::Float(v) => v.len(),
            DataChunk::Text(v) => v.len(),
        }
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rectangular selection of a dataset: a start and a count per axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    /// First index along each axis.
    pub start: Vec<usize>,
    /// Number of indices along each axis.
    pub count: Vec<usize>,
}

impl Hyperslab {
    /// Select `rows` along the leading axis and everything along the others.
    pub fn rows(shape: &[usize], rows: Range<usize>) -> Self {
        let mut start = vec![0; shape.len()];
        let mut count = shape.to_vec();
        if let (Some(first), Some(len)) = (start.first_mut(), count.first_mut()) {
            *first = rows.start;
            *len = rows.end.saturating_sub(rows.start);
        }
        Self { start, count }
    }

    /// Number of values selected.
    pub fn len(&self) -> usize {
        element_count(&self.count).unwrap_or(usize::MAX)
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the selection lies inside a dataset of the given shape.
    pub fn fits(&self, shape: &[usize]) -> bool {
        self.start.len() == shape.len()
            && self.count.len() == shape.len()
            && self
                .start
                .iter()
                .zip(&self.count)
                .zip(shape)
                .all(|((&start, &count), &dim)| start.checked_add(count).is_some_and(|end| end <= dim))
    }
}

/// Number of values in an array of the given shape, `None` on overflow.
///
/// A zero-length axis makes the array empty whatever the other axes hold.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    if shape.contains(&0) {
        return Some(0);
    }
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Read-only access to an open container.
///
/// All paths are absolute and slash-delimited, the root being `"/"`.
/// Implementations close the underlying handle when dropped.
pub trait ContainerAccess {
    /// Classify the node at `path`.
    ///
    /// Returns [`H5LensError::NodeNotFound`](crate::H5LensError::NodeNotFound)
    /// when nothing lives there.
    fn kind(&self, path: &str) -> Result<NodeKind>;

    /// List the children of the group at `path` in enumeration order.
    fn list_children(&self, path: &str) -> Result<Vec<(String, NodeKind)>>;

    /// Get the shape and element type of the dataset at `path`.
    fn shape_dtype(&self, path: &str) -> Result<(Vec<usize>, Dtype)>;

    /// Read every attribute of the node at `path`.
    fn attributes(&self, path: &str) -> Result<Vec<(String, AttributeValue)>>;

    /// Read the whole dataset at `path`.
    fn read_dataset(&self, path: &str) -> Result<DataChunk>;

    /// Read the values selected by `slab` from the dataset at `path`.
    ///
    /// The chunk holds `slab.len()` values in row-major order.
    fn read_slab(&self, path: &str, slab: &Hyperslab) -> Result<DataChunk>;
}

/// Join a child name onto a parent container path.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Get the last component of a container path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "grp"), "/grp");
        assert_eq!(join_path("/grp", "ds"), "/grp/ds");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/grp/ds"), "ds");
        assert_eq!(base_name("/grp"), "grp");
        assert_eq!(base_name("/"), "/");
    }

    #[test]
    fn test_dtype_display() {
        assert_eq!(Dtype::Int(32).to_string(), "int32");
        assert_eq!(Dtype::UInt(8).to_string(), "uint8");
        assert_eq!(Dtype::Float(64).to_string(), "float64");
        assert_eq!(Dtype::FixedBytes(10).to_string(), "|S10");
        assert_eq!(Dtype::VarString.to_string(), "str");
        assert_eq!(Dtype::Other("compound".into()).to_string(), "compound");
    }

    #[test]
    fn test_number_display_keeps_float_marker() {
        assert_eq!(Number::Float64(2.0).to_string(), "2.0");
        assert_eq!(Number::Float32(0.1).to_string(), "0.1");
        assert_eq!(Number::Int { bits: 32, value: -4 }.to_string(), "-4");
        assert_eq!(Number::UInt { bits: 8, value: 7 }.kind_name(), "uint8");
    }

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[4, 3]), Some(12));
        assert_eq!(element_count(&[1 << 33, 1 << 33]), None);
        assert_eq!(element_count(&[1 << 33, 1 << 33, 0]), Some(0));
    }

    #[test]
    fn test_hyperslab_rows() {
        let slab = Hyperslab::rows(&[5, 3], 1..3);
        assert_eq!(slab.start, vec![1, 0]);
        assert_eq!(slab.count, vec![2, 3]);
        assert_eq!(slab.len(), 6);
        assert!(slab.fits(&[5, 3]));
        assert!(!Hyperslab::rows(&[2, 3], 1..3).fits(&[2, 3]));
        assert!(!slab.fits(&[5]));
    }
}
