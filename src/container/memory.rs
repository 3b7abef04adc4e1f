//! In-memory container.
//!
//! Builds a container hierarchy in code. Used by the test suite and handy for
//! embedding h5lens views over data that never touched disk. Individual nodes
//! can be marked as unreadable to exercise error paths.

use super::{
    element_count, join_path, AttributeValue, ContainerAccess, DataChunk, Dtype, Hyperslab,
    NodeKind, ROOT_PATH,
};
use crate::error::{H5LensError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Entry {
    Group {
        children: Vec<String>,
    },
    Dataset {
        shape: Vec<usize>,
        dtype: Dtype,
        data: DataChunk,
    },
    Other,
}

#[derive(Debug, Clone)]
struct Node {
    entry: Entry,
    attributes: Vec<(String, AttributeValue)>,
    broken_listing: bool,
    broken_meta: bool,
    broken_data: bool,
}

impl Node {
    fn new(entry: Entry) -> Self {
        Self {
            entry,
            attributes: Vec::new(),
            broken_listing: false,
            broken_meta: false,
            broken_data: false,
        }
    }
}

/// A container held entirely in memory.
#[derive(Debug)]
pub struct MemoryContainer {
    nodes: HashMap<String, Node>,
    reads: RefCell<Vec<usize>>,
}

impl MemoryContainer {
    /// Create a container holding only the root group.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_PATH.to_string(),
            Node::new(Entry::Group {
                children: Vec::new(),
            }),
        );
        Self {
            nodes,
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Add a group, creating missing parents.
    pub fn group(mut self, path: &str) -> Self {
        self.insert(
            path,
            Entry::Group {
                children: Vec::new(),
            },
        );
        self
    }

    /// Add a dataset, creating missing parents.
    ///
    /// `data` is stored in row-major order and should hold `product(shape)` values.
    pub fn dataset(mut self, path: &str, shape: &[usize], dtype: Dtype, data: DataChunk) -> Self {
        self.insert(
            path,
            Entry::Dataset {
                shape: shape.to_vec(),
                dtype,
                data,
            },
        );
        self
    }

    /// Add a node that is neither a group nor a dataset.
    pub fn other(mut self, path: &str) -> Self {
        self.insert(path, Entry::Other);
        self
    }

    /// Attach an attribute to an existing node.
    pub fn attr(mut self, path: &str, key: &str, value: AttributeValue) -> Self {
        if let Some(node) = self.nodes.get_mut(path) {
            node.attributes.push((key.to_string(), value));
        }
        self
    }

    /// Make listing the children of `path` fail.
    pub fn break_listing(mut self, path: &str) -> Self {
        if let Some(node) = self.nodes.get_mut(path) {
            node.broken_listing = true;
        }
        self
    }

    /// Make shape/dtype lookups of `path` fail.
    pub fn break_metadata(mut self, path: &str) -> Self {
        if let Some(node) = self.nodes.get_mut(path) {
            node.broken_meta = true;
        }
        self
    }

    /// Make data reads of `path` fail.
    pub fn break_data(mut self, path: &str) -> Self {
        if let Some(node) = self.nodes.get_mut(path) {
            node.broken_data = true;
        }
        self
    }

    /// Sizes (in values) of every data read served so far.
    pub fn read_sizes(&self) -> Vec<usize> {
        self.reads.borrow().clone()
    }

    fn insert(&mut self, path: &str, entry: Entry) {
        let path = normalize(path);
        if self.nodes.contains_key(&path) {
            return;
        }

        let (parent, name) = split_parent(&path);
        if !self.nodes.contains_key(&parent) {
            self.insert(
                &parent,
                Entry::Group {
                    children: Vec::new(),
                },
            );
        }
        if let Some(Node {
            entry: Entry::Group { children },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.push(name);
        }
        self.nodes.insert(path, Node::new(entry));
    }

    fn node(&self, path: &str) -> Result<&Node> {
        self.nodes
            .get(path)
            .ok_or_else(|| H5LensError::node_not_found(path))
    }

    fn dataset_node(&self, path: &str) -> Result<(&Node, &[usize], &DataChunk)> {
        let node = self.node(path)?;
        match &node.entry {
            Entry::Dataset { shape, data, .. } => Ok((node, shape, data)),
            _ => Err(H5LensError::not_a_dataset(path)),
        }
    }

    fn record_read(&self, chunk: DataChunk) -> DataChunk {
        self.reads.borrow_mut().push(chunk.len());
        chunk
    }
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerAccess for MemoryContainer {
    fn kind(&self, path: &str) -> Result<NodeKind> {
        Ok(match self.node(path)?.entry {
            Entry::Group { .. } => NodeKind::Group,
            Entry::Dataset { .. } => NodeKind::Dataset,
            Entry::Other => NodeKind::Unknown,
        })
    }

    fn list_children(&self, path: &str) -> Result<Vec<(String, NodeKind)>> {
        let node = self.node(path)?;
        if node.broken_listing {
            return Err(H5LensError::read(path, "corrupted link table"));
        }
        match &node.entry {
            Entry::Group { children } => children
                .iter()
                .map(|name| {
                    let kind = self.kind(&join_path(path, name))?;
                    Ok((name.clone(), kind))
                })
                .collect(),
            _ => Err(H5LensError::read(path, "not a group")),
        }
    }

    fn shape_dtype(&self, path: &str) -> Result<(Vec<usize>, Dtype)> {
        let node = self.node(path)?;
        if node.broken_meta {
            return Err(H5LensError::read(path, "corrupted object header"));
        }
        match &node.entry {
            Entry::Dataset { shape, dtype, .. } => Ok((shape.clone(), dtype.clone())),
            _ => Err(H5LensError::not_a_dataset(path)),
        }
    }

    fn attributes(&self, path: &str) -> Result<Vec<(String, AttributeValue)>> {
        Ok(self.node(path)?.attributes.clone())
    }

    fn read_dataset(&self, path: &str) -> Result<DataChunk> {
        let (node, _, data) = self.dataset_node(path)?;
        if node.broken_data {
            return Err(H5LensError::read(path, "corrupted chunk"));
        }
        Ok(self.record_read(data.clone()))
    }

    fn read_slab(&self, path: &str, slab: &Hyperslab) -> Result<DataChunk> {
        let (node, shape, data) = self.dataset_node(path)?;
        if node.broken_data {
            return Err(H5LensError::read(path, "corrupted chunk"));
        }
        if element_count(shape).is_none() {
            return Err(H5LensError::read(path, format!("shape {:?} too large to address", shape)));
        }
        if !slab.fits(shape) {
            return Err(H5LensError::read(
                path,
                format!("selection {:?}+{:?} out of bounds for {:?}", slab.start, slab.count, shape),
            ));
        }
        Ok(self.record_read(gather(data, &slab_offsets(shape, slab))))
    }
}

/// Row-major offsets of every value `slab` selects from an array of `shape`.
fn slab_offsets(shape: &[usize], slab: &Hyperslab) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(slab.len());
    if slab.is_empty() {
        return offsets;
    }

    let strides: Vec<usize> = (0..shape.len())
        .map(|axis| shape[axis + 1..].iter().product())
        .collect();
    let mut index = vec![0usize; shape.len()];
    loop {
        offsets.push(
            index
                .iter()
                .zip(&slab.start)
                .zip(&strides)
                .map(|((i, start), stride)| (i + start) * stride)
                .sum(),
        );

        // Odometer step over the selected counts, last axis fastest.
        let mut axis = shape.len();
        loop {
            if axis == 0 {
                return offsets;
            }
            axis -= 1;
            index[axis] += 1;
            if index[axis] < slab.count[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
}

fn gather(data: &DataChunk, offsets: &[usize]) -> DataChunk {
    fn pick<T: Clone>(values: &[T], offsets: &[usize]) -> Vec<T> {
        offsets.iter().filter_map(|&i| values.get(i).cloned()).collect()
    }
    match data {
        DataChunk::Int(v) => DataChunk::Int(pick(v, offsets)),
        DataChunk::UInt(v) => DataChunk::UInt(pick(v, offsets)),
        DataChunk::Float(v) => DataChunk::Float(pick(v, offsets)),
        DataChunk::Text(v) => DataChunk::Text(pick(v, offsets)),
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn split_parent(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(0) => (ROOT_PATH.to_string(), path[1..].to_string()),
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => (ROOT_PATH.to_string(), path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryContainer {
        MemoryContainer::new()
            .dataset(
                "/grp/matrix",
                &[3, 2],
                Dtype::Int(32),
                DataChunk::Int(vec![1, 2, 3, 4, 5, 6]),
            )
            .group("/empty")
    }

    #[test]
    fn test_missing_parents_are_created() {
        let container = sample();
        assert_eq!(container.kind("/grp").unwrap(), NodeKind::Group);
        assert_eq!(
            container.list_children("/").unwrap(),
            vec![
                ("grp".to_string(), NodeKind::Group),
                ("empty".to_string(), NodeKind::Group),
            ]
        );
    }

    #[test]
    fn test_read_slab_rows() {
        let container = sample();
        let chunk = container
            .read_slab("/grp/matrix", &Hyperslab::rows(&[3, 2], 1..3))
            .unwrap();
        assert_eq!(chunk, DataChunk::Int(vec![3, 4, 5, 6]));
        assert_eq!(container.read_sizes(), vec![4]);
        assert!(container
            .read_slab("/grp/matrix", &Hyperslab::rows(&[3, 2], 2..4))
            .is_err());
    }

    #[test]
    fn test_read_slab_inner_axis() {
        let container = sample();
        let column = Hyperslab {
            start: vec![0, 1],
            count: vec![3, 1],
        };
        assert_eq!(
            container.read_slab("/grp/matrix", &column).unwrap(),
            DataChunk::Int(vec![2, 4, 6])
        );

        let cell = Hyperslab {
            start: vec![2, 0],
            count: vec![1, 1],
        };
        assert_eq!(
            container.read_slab("/grp/matrix", &cell).unwrap(),
            DataChunk::Int(vec![5])
        );
    }

    #[test]
    fn test_broken_listing() {
        let container = sample().break_listing("/grp");
        assert!(container.list_children("/grp").is_err());
        assert!(container.list_children("/").is_ok());
    }

    #[test]
    fn test_unknown_path() {
        let container = sample();
        assert!(matches!(
            container.kind("/nope"),
            Err(H5LensError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_broken_nodes_fail_locally() {
        let container = sample()
            .break_metadata("/grp/matrix")
            .break_data("/grp/matrix");
        assert!(container.shape_dtype("/grp/matrix").is_err());
        assert!(container.read_dataset("/grp/matrix").is_err());
        assert!(container.list_children("/grp").is_ok());
    }
}
