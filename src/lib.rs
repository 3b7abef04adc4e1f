//! h5lens - A terminal-based HDF5 browser.
//!
//! h5lens shows the group/dataset hierarchy of an HDF5 file as a tree, the
//! attributes of the highlighted node in a metadata panel, and on request a
//! preview with summary statistics of a dataset in a data panel. Dataset
//! contents are only read on inspection, in bounded chunks, so files far
//! larger than memory can be browsed.
//!
//! # Features
//!
//! - Structural tree built once from names, kinds, shapes and dtypes
//! - Attribute tables that degrade per row instead of failing
//! - Streaming min/max/mean and a bounded preview
//! - Deferred, cancellable inspection that keeps the UI responsive
//! - Vim-style keyboard shortcuts
//!
//! # Example
//!
//! ```ignore
//! use h5lens::container::Hdf5Container;
//! use h5lens::inspect::DatasetInspector;
//! use std::path::Path;
//!
//! let container = Hdf5Container::open(Path::new("run.h5"))?;
//! let result = DatasetInspector::default().inspect(&container, "/grp/ds");
//! println!("{}", result.render());
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod container;
pub mod error;
pub mod format;
pub mod inspect;
pub mod navigation;
pub mod session;
pub mod tree;
pub mod ui;

pub use error::{H5LensError, Result};
