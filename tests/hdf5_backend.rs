//! HDF5 backend tests against files written on the fly.

use h5lens::config::{InspectorConfig, ReadStrategy};
use h5lens::container::{ContainerAccess, DataChunk, Dtype, Hdf5Container, Hyperslab, NodeKind};
use h5lens::format::metadata_text;
use h5lens::inspect::{DatasetInspector, InspectionError, StatValue};
use h5lens::tree::TreeModel;
use hdf5::types::VarLenUnicode;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join("sample.h5");
    let file = hdf5::File::create(&path).unwrap();

    let grp = file.create_group("grp").unwrap();
    let ds = grp
        .new_dataset_builder()
        .with_data(&ndarray::arr1(&[1i32, 2, 3]))
        .create("ds")
        .unwrap();
    let unit: VarLenUnicode = "m".parse().unwrap();
    ds.new_attr::<VarLenUnicode>()
        .shape(())
        .create("unit")
        .unwrap()
        .write_scalar(&unit)
        .unwrap();

    let grid = ndarray::Array2::from_shape_fn((4, 3), |(i, j)| (i * 3 + j) as f64);
    grp.new_dataset_builder()
        .with_data(&grid)
        .create("grid")
        .unwrap();

    file.create_group("empty").unwrap();
    path
}

fn open_sample() -> (TempDir, Hdf5Container) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    let container = Hdf5Container::open(&path).unwrap();
    (dir, container)
}

#[test]
fn test_open_rejects_non_hdf5() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.h5");
    std::fs::write(&path, b"junk").unwrap();

    let err = Hdf5Container::open(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to open"));
}

#[test]
fn test_tree_labels() {
    let (_dir, container) = open_sample();
    let model = TreeModel::build(&container, "/");

    assert_eq!(model.find("/grp").unwrap().label, "grp/ (Group)");
    assert_eq!(
        model.find("/grp/ds").unwrap().label,
        "ds (Dataset) [int32, shape=(3,)]"
    );
    assert_eq!(
        model.find("/grp/grid").unwrap().label,
        "grid (Dataset) [float64, shape=(4, 3)]"
    );

    let empty = model.find("/empty").unwrap();
    assert!(empty.is_expandable());
    assert!(empty.children.is_empty());
    assert_eq!(model.node_count(), 5);
}

#[test]
fn test_kinds_and_missing_nodes() {
    let (_dir, container) = open_sample();
    assert_eq!(container.kind("/").unwrap(), NodeKind::Group);
    assert_eq!(container.kind("/grp/ds").unwrap(), NodeKind::Dataset);
    assert!(container.kind("/nope").is_err());
}

#[test]
fn test_attributes_in_metadata_panel() {
    let (_dir, container) = open_sample();
    let attrs = container.attributes("/grp/ds").unwrap();
    let (shape, dtype) = container.shape_dtype("/grp/ds").unwrap();

    let text = metadata_text("/grp/ds", NodeKind::Dataset, Some(&shape), Some(&dtype), &attrs);
    assert!(text.contains("- Shape: (3,)\n- Type: int32\n"));
    assert!(text.contains("| unit | str | m |"));
}

#[test]
fn test_read_rows_hyperslab() {
    let (_dir, container) = open_sample();
    let rows = container
        .read_slab("/grp/grid", &Hyperslab::rows(&[4, 3], 1..3))
        .unwrap();
    assert_eq!(
        rows,
        DataChunk::Float(vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
    );
    assert_eq!(container.shape_dtype("/grp/grid").unwrap().1, Dtype::Float(64));
}

#[test]
fn test_read_inner_axis_hyperslab() {
    let (_dir, container) = open_sample();
    let slab = Hyperslab {
        start: vec![2, 1],
        count: vec![1, 2],
    };
    assert_eq!(
        container.read_slab("/grp/grid", &slab).unwrap(),
        DataChunk::Float(vec![7.0, 8.0])
    );

    let outside = Hyperslab {
        start: vec![3, 2],
        count: vec![1, 2],
    };
    assert!(container.read_slab("/grp/grid", &outside).is_err());
}

#[test]
fn test_inspect_int_dataset() {
    let (_dir, container) = open_sample();
    let result = DatasetInspector::default().inspect(&container, "/grp/ds");
    let stats = result.statistics.clone().unwrap();

    assert_eq!(stats.min, StatValue::Int(1));
    assert_eq!(stats.max, StatValue::Int(3));
    assert_eq!(stats.mean, 2.0);
    assert!(result.render().contains(" - mean: 2.0\n"));
}

#[test]
fn test_chunked_matches_whole_read() {
    let (_dir, container) = open_sample();
    let chunked = DatasetInspector::new(InspectorConfig {
        chunk_elements: 3,
        ..InspectorConfig::default()
    })
    .inspect(&container, "/grp/grid");
    let whole = DatasetInspector::new(InspectorConfig {
        read_strategy: ReadStrategy::Whole,
        ..InspectorConfig::default()
    })
    .inspect(&container, "/grp/grid");

    assert_eq!(chunked, whole);
    assert_eq!(chunked.statistics.unwrap().mean, 5.5);

    // Rows wider than the budget are split along the inner axis.
    let split = DatasetInspector::new(InspectorConfig {
        chunk_elements: 2,
        ..InspectorConfig::default()
    })
    .inspect(&container, "/grp/grid");
    assert_eq!(split, whole);
}

#[test]
fn test_inspect_group_is_rejected() {
    let (_dir, container) = open_sample();
    let result = DatasetInspector::default().inspect(&container, "/empty");
    assert_eq!(result.error, Some(InspectionError::NotADataset));
}
