//! Structural tree of the container.
//!
//! The whole group/dataset hierarchy is enumerated once when the container is
//! opened: names, kinds, shapes and dtypes only. Dataset contents are never
//! touched here, which keeps the build cheap for files holding terabytes of
//! data. Very wide or deep hierarchies are the scalability boundary of this
//! approach, since every entry becomes a node.
//!
//! Container hierarchies are assumed to be acyclic (parent/child links only),
//! as the HDF5 format guarantees for hard links; the builder does no cycle
//! detection.

use crate::container::{base_name, join_path, ContainerAccess, Dtype, NodeKind, ROOT_PATH};
use crate::format::shape_tuple;

/// Marker shown for a shape or dtype that could not be read.
pub const PLACEHOLDER: &str = "?";

/// Label of the root node.
pub const ROOT_LABEL: &str = "(root)";

/// A node in the navigation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Display label.
    pub label: String,
    /// Absolute container path.
    pub path: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Dataset shape; `None` when not a dataset or unreadable.
    pub shape: Option<Vec<usize>>,
    /// Dataset dtype; `None` when not a dataset or unreadable.
    pub dtype: Option<Dtype>,
    /// Children in enumeration order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Check if this node is a group.
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Check if this node is a dataset.
    pub fn is_dataset(&self) -> bool {
        self.kind == NodeKind::Dataset
    }

    /// Groups can always be expanded, even when empty.
    pub fn is_expandable(&self) -> bool {
        self.is_group()
    }

    /// Shape as shown in the label, or the placeholder.
    pub fn shape_label(&self) -> String {
        self.shape
            .as_deref()
            .map(shape_tuple)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Dtype as shown in the label, or the placeholder.
    pub fn dtype_label(&self) -> String {
        self.dtype
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// The navigation tree built from a container.
#[derive(Debug, Clone)]
pub struct TreeModel {
    root: TreeNode,
}

impl TreeModel {
    /// Enumerate the hierarchy below `root_path`.
    ///
    /// A dataset whose shape or dtype cannot be read still gets a node, with
    /// placeholder markers; a group whose members cannot be listed becomes a
    /// node without children. Neither aborts the build.
    pub fn build<C: ContainerAccess + ?Sized>(container: &C, root_path: &str) -> Self {
        let label = if root_path == ROOT_PATH {
            ROOT_LABEL.to_string()
        } else {
            base_name(root_path).to_string()
        };
        let kind = container.kind(root_path).unwrap_or(NodeKind::Group);
        let mut root = TreeNode {
            label,
            path: root_path.to_string(),
            kind,
            shape: None,
            dtype: None,
            children: Vec::new(),
        };
        if kind == NodeKind::Group {
            root.children = build_children(container, root_path);
        }

        let model = Self { root };
        tracing::info!("Built tree with {} nodes", model.node_count());
        model
    }

    /// The root node.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Container path a node stands for.
    pub fn resolve<'a>(&self, node: &'a TreeNode) -> &'a str {
        &node.path
    }

    /// Find the node with the given container path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        self.root.iter().find(|node| node.path == path)
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.iter().count()
    }
}

fn build_children<C: ContainerAccess + ?Sized>(container: &C, path: &str) -> Vec<TreeNode> {
    let children = match container.list_children(path) {
        Ok(children) => children,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", path, e);
            return Vec::new();
        },
    };

    children
        .into_iter()
        .map(|(name, kind)| {
            let child_path = join_path(path, &name);
            match kind {
                NodeKind::Group => TreeNode {
                    label: format!("{}/ (Group)", name),
                    children: build_children(container, &child_path),
                    path: child_path,
                    kind,
                    shape: None,
                    dtype: None,
                },
                NodeKind::Dataset => dataset_node(container, name, child_path),
                NodeKind::Unknown => TreeNode {
                    label: format!("{} (Unknown)", name),
                    path: child_path,
                    kind,
                    shape: None,
                    dtype: None,
                    children: Vec::new(),
                },
            }
        })
        .collect()
}

fn dataset_node<C: ContainerAccess + ?Sized>(container: &C, name: String, path: String) -> TreeNode {
    let (shape, dtype) = match container.shape_dtype(&path) {
        Ok((shape, dtype)) => (Some(shape), Some(dtype)),
        Err(e) => {
            tracing::warn!("Cannot read shape/dtype of {}: {}", path, e);
            (None, None)
        },
    };

    let mut node = TreeNode {
        label: String::new(),
        path,
        kind: NodeKind::Dataset,
        shape,
        dtype,
        children: Vec::new(),
    };
    node.label = format!(
        "{} (Dataset) [{}, shape={}]",
        name,
        node.dtype_label(),
        node.shape_label()
    );
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DataChunk, MemoryContainer};
    use std::collections::HashSet;

    fn sample() -> MemoryContainer {
        MemoryContainer::new()
            .dataset("/grp/ds", &[3], Dtype::Int(32), DataChunk::Int(vec![1, 2, 3]))
            .dataset(
                "/grp/names",
                &[2],
                Dtype::VarString,
                DataChunk::Text(vec!["a".into(), "b".into()]),
            )
            .group("/grp/sub/deeper")
            .group("/empty")
            .dataset("/scalar", &[], Dtype::Float(64), DataChunk::Float(vec![0.5]))
            .other("/dtype")
    }

    #[test]
    fn test_labels() {
        let model = TreeModel::build(&sample(), "/");
        assert_eq!(model.root().label, "(root)");
        assert_eq!(model.find("/grp").unwrap().label, "grp/ (Group)");
        assert_eq!(
            model.find("/grp/ds").unwrap().label,
            "ds (Dataset) [int32, shape=(3,)]"
        );
        assert_eq!(
            model.find("/scalar").unwrap().label,
            "scalar (Dataset) [float64, shape=()]"
        );
        assert_eq!(model.find("/dtype").unwrap().label, "dtype (Unknown)");
    }

    #[test]
    fn test_one_node_per_entry() {
        let model = TreeModel::build(&sample(), "/");
        let paths: Vec<&str> = model.root().iter().map(|n| n.path.as_str()).collect();
        let unique: HashSet<&str> = paths.iter().copied().collect();

        assert_eq!(paths.len(), unique.len());
        assert_eq!(
            unique,
            [
                "/",
                "/grp",
                "/grp/ds",
                "/grp/names",
                "/grp/sub",
                "/grp/sub/deeper",
                "/empty",
                "/scalar",
                "/dtype",
            ]
            .into_iter()
            .collect()
        );
        assert_eq!(model.node_count(), 9);
    }

    #[test]
    fn test_children_keep_enumeration_order() {
        let model = TreeModel::build(&sample(), "/");
        let names: Vec<&str> = model
            .find("/grp")
            .unwrap()
            .children
            .iter()
            .map(|n| n.path.as_str())
            .collect();
        assert_eq!(names, vec!["/grp/ds", "/grp/names", "/grp/sub"]);
    }

    #[test]
    fn test_unreadable_dataset_gets_placeholders() {
        let container = sample().break_metadata("/grp/ds");
        let model = TreeModel::build(&container, "/");

        let node = model.find("/grp/ds").unwrap();
        assert_eq!(node.shape_label(), "?");
        assert_eq!(node.dtype_label(), "?");
        assert_eq!(node.label, "ds (Dataset) [?, shape=?]");

        // Siblings are still present.
        assert!(model.find("/grp/names").is_some());
        assert!(model.find("/grp/sub/deeper").is_some());
    }

    #[test]
    fn test_unlistable_group_is_left_empty() {
        let container = sample().break_listing("/grp");
        let model = TreeModel::build(&container, "/");

        let grp = model.find("/grp").unwrap();
        assert_eq!(grp.label, "grp/ (Group)");
        assert!(grp.is_expandable());
        assert!(grp.children.is_empty());
        assert!(model.find("/grp/ds").is_none());

        // Siblings of the broken group are still built.
        assert!(model.find("/empty").is_some());
        assert!(model.find("/scalar").is_some());
        assert!(model.find("/dtype").is_some());
        assert_eq!(model.node_count(), 5);
    }

    #[test]
    fn test_empty_group_is_expandable() {
        let model = TreeModel::build(&sample(), "/");
        let node = model.find("/empty").unwrap();
        assert!(node.is_expandable());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_resolve_returns_attached_path() {
        let model = TreeModel::build(&sample(), "/");
        let node = model.find("/grp/sub/deeper").unwrap();
        assert_eq!(model.resolve(node), "/grp/sub/deeper");
        assert_eq!(model.resolve(model.root()), "/");
    }

    #[test]
    fn test_build_from_subgroup() {
        let model = TreeModel::build(&sample(), "/grp");
        assert_eq!(model.root().label, "grp");
        assert_eq!(model.root().children.len(), 3);
    }
}
