//! HDF5 container backend.

use super::{
    join_path, ArrayValues, AttributeValue, ContainerAccess, DataChunk, Dtype, Hyperslab, NodeKind,
    Number, TextKind, ROOT_PATH,
};
use crate::error::{H5LensError, Result};
use hdf5::types::{
    FixedAscii, FixedUnicode, FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode,
};
use hdf5::{Attribute, Dataset, File, H5Type, Location};
use ndarray::{IxDyn, SliceInfo, SliceInfoElem};
use std::path::Path;

/// Capacity used when reading fixed-length strings; longer values are cut.
const FIXED_STR_CAP: usize = 256;

/// A read-only HDF5 file.
///
/// The file handle is closed when the container is dropped.
#[derive(Debug)]
pub struct Hdf5Container {
    file: File,
}

impl Hdf5Container {
    /// Open an HDF5 file read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| H5LensError::open(path, e))?;
        tracing::info!("Opened {}", path.display());
        Ok(Self { file })
    }

    fn dataset(&self, path: &str) -> Result<Dataset> {
        self.file.dataset(path).map_err(|e| H5LensError::read(path, e))
    }

    fn read_chunk(&self, path: &str, slab: Option<&Hyperslab>) -> Result<DataChunk> {
        let ds = self.dataset(path)?;
        let descriptor = ds
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(|e| H5LensError::read(path, e))?;

        match descriptor {
            TypeDescriptor::Integer(_) => Ok(DataChunk::Int(read_values(&ds, path, slab)?)),
            TypeDescriptor::Unsigned(_) => Ok(DataChunk::UInt(read_values(&ds, path, slab)?)),
            TypeDescriptor::Float(_) => Ok(DataChunk::Float(read_values(&ds, path, slab)?)),
            TypeDescriptor::VarLenUnicode => {
                let values: Vec<VarLenUnicode> = read_values(&ds, path, slab)?;
                Ok(DataChunk::Text(values.iter().map(|s| s.as_str().to_owned()).collect()))
            },
            TypeDescriptor::VarLenAscii => {
                let values: Vec<VarLenAscii> = read_values(&ds, path, slab)?;
                Ok(DataChunk::Text(values.iter().map(|s| s.as_str().to_owned()).collect()))
            },
            TypeDescriptor::FixedAscii(_) => {
                let values: Vec<FixedAscii<FIXED_STR_CAP>> = read_values(&ds, path, slab)?;
                Ok(DataChunk::Text(values.iter().map(|s| s.as_str().to_owned()).collect()))
            },
            TypeDescriptor::FixedUnicode(_) => {
                let values: Vec<FixedUnicode<FIXED_STR_CAP>> = read_values(&ds, path, slab)?;
                Ok(DataChunk::Text(values.iter().map(|s| s.as_str().to_owned()).collect()))
            },
            other => Err(H5LensError::read(
                path,
                format!("unsupported dtype {}", descriptor_name(&other)),
            )),
        }
    }
}

impl ContainerAccess for Hdf5Container {
    fn kind(&self, path: &str) -> Result<NodeKind> {
        if path == ROOT_PATH || self.file.group(path).is_ok() {
            return Ok(NodeKind::Group);
        }
        if self.file.dataset(path).is_ok() {
            return Ok(NodeKind::Dataset);
        }
        if self.file.link_exists(path) {
            return Ok(NodeKind::Unknown);
        }
        Err(H5LensError::node_not_found(path))
    }

    fn list_children(&self, path: &str) -> Result<Vec<(String, NodeKind)>> {
        let group = self.file.group(path).map_err(|e| H5LensError::read(path, e))?;
        let names = group.member_names().map_err(|e| H5LensError::read(path, e))?;

        Ok(names
            .into_iter()
            .map(|name| {
                let kind = self
                    .kind(&join_path(path, &name))
                    .unwrap_or(NodeKind::Unknown);
                (name, kind)
            })
            .collect())
    }

    fn shape_dtype(&self, path: &str) -> Result<(Vec<usize>, Dtype)> {
        let ds = self.dataset(path)?;
        let descriptor = ds
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(|e| H5LensError::read(path, e))?;
        Ok((ds.shape(), dtype_of(&descriptor)))
    }

    fn attributes(&self, path: &str) -> Result<Vec<(String, AttributeValue)>> {
        match self.kind(path)? {
            NodeKind::Group => {
                let group = self.file.group(path).map_err(|e| H5LensError::read(path, e))?;
                read_attributes(&group, path)
            },
            NodeKind::Dataset => {
                let ds = self.dataset(path)?;
                read_attributes(&ds, path)
            },
            NodeKind::Unknown => Ok(Vec::new()),
        }
    }

    fn read_dataset(&self, path: &str) -> Result<DataChunk> {
        self.read_chunk(path, None)
    }

    fn read_slab(&self, path: &str, slab: &Hyperslab) -> Result<DataChunk> {
        self.read_chunk(path, Some(slab))
    }
}

/// Read the whole dataset, or the hyperslab `slab`.
fn read_values<T: H5Type + Clone>(
    ds: &Dataset,
    path: &str,
    slab: Option<&Hyperslab>,
) -> Result<Vec<T>> {
    let Some(slab) = slab else {
        return ds.read_raw::<T>().map_err(|e| H5LensError::read(path, e));
    };

    let shape = ds.shape();
    if !slab.fits(&shape) {
        return Err(H5LensError::read(
            path,
            format!("selection {:?}+{:?} out of bounds for {:?}", slab.start, slab.count, shape),
        ));
    }
    let elems: Vec<SliceInfoElem> = slab
        .start
        .iter()
        .zip(&slab.count)
        .map(|(&start, &count)| SliceInfoElem::from(start..start + count))
        .collect();

    let selection = SliceInfo::<Vec<SliceInfoElem>, IxDyn, IxDyn>::try_from(elems)
        .map_err(|e| H5LensError::read(path, e))?;
    let array = ds
        .read_slice::<T, _, IxDyn>(selection)
        .map_err(|e| H5LensError::read(path, e))?;

    Ok(array.iter().cloned().collect())
}

fn read_attributes(location: &Location, path: &str) -> Result<Vec<(String, AttributeValue)>> {
    let names = location
        .attr_names()
        .map_err(|e| H5LensError::read(path, e))?;

    Ok(names
        .into_iter()
        .map(|name| {
            let value = match location.attr(&name).and_then(|attr| attribute_value(&attr)) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Unreadable attribute {}:{}: {}", path, name, e);
                    AttributeValue::Unrecognized {
                        kind: attribute_type_name(location, &name),
                    }
                },
            };
            (name, value)
        })
        .collect())
}

/// Name the stored type of an attribute whose value could not be decoded.
fn attribute_type_name(location: &Location, name: &str) -> String {
    location
        .attr(name)
        .and_then(|attr| attr.dtype())
        .and_then(|dtype| dtype.to_descriptor())
        .map(|descriptor| dtype_of(&descriptor).to_string())
        .unwrap_or_else(|_| "unreadable".to_string())
}

fn attribute_value(attr: &Attribute) -> hdf5::Result<AttributeValue> {
    let descriptor = attr.dtype()?.to_descriptor()?;
    let scalar = attr.ndim() == 0;
    let shape = attr.shape();

    let value = match descriptor {
        TypeDescriptor::Integer(size) if scalar => AttributeValue::Scalar(Number::Int {
            bits: int_bits(size),
            value: attr.read_scalar::<i64>()?,
        }),
        TypeDescriptor::Integer(_) => AttributeValue::Array {
            shape,
            values: ArrayValues::Int(attr.read_raw::<i64>()?),
        },
        TypeDescriptor::Unsigned(size) if scalar => AttributeValue::Scalar(Number::UInt {
            bits: int_bits(size),
            value: attr.read_scalar::<u64>()?,
        }),
        TypeDescriptor::Unsigned(_) => AttributeValue::Array {
            shape,
            values: ArrayValues::UInt(attr.read_raw::<u64>()?),
        },
        TypeDescriptor::Float(FloatSize::U4) if scalar => {
            AttributeValue::Scalar(Number::Float32(attr.read_scalar::<f32>()?))
        },
        TypeDescriptor::Float(FloatSize::U4) => AttributeValue::Array {
            shape,
            values: ArrayValues::Float32(attr.read_raw::<f32>()?),
        },
        TypeDescriptor::Float(FloatSize::U8) if scalar => {
            AttributeValue::Scalar(Number::Float64(attr.read_scalar::<f64>()?))
        },
        TypeDescriptor::Float(FloatSize::U8) => AttributeValue::Array {
            shape,
            values: ArrayValues::Float64(attr.read_raw::<f64>()?),
        },
        TypeDescriptor::VarLenUnicode => {
            let values: Vec<VarLenUnicode> = attr.read_raw()?;
            text_attribute(TextKind::Str, scalar, shape, values.iter().map(|s| s.as_str()))
        },
        TypeDescriptor::VarLenAscii => {
            let values: Vec<VarLenAscii> = attr.read_raw()?;
            text_attribute(TextKind::Str, scalar, shape, values.iter().map(|s| s.as_str()))
        },
        TypeDescriptor::FixedAscii(_) => {
            let values: Vec<FixedAscii<FIXED_STR_CAP>> = attr.read_raw()?;
            text_attribute(TextKind::Bytes, scalar, shape, values.iter().map(|s| s.as_str()))
        },
        TypeDescriptor::FixedUnicode(_) => {
            let values: Vec<FixedUnicode<FIXED_STR_CAP>> = attr.read_raw()?;
            text_attribute(TextKind::Bytes, scalar, shape, values.iter().map(|s| s.as_str()))
        },
        other => AttributeValue::Unrecognized {
            kind: descriptor_name(&other),
        },
    };

    Ok(value)
}

fn text_attribute<'a>(
    kind: TextKind,
    scalar: bool,
    shape: Vec<usize>,
    values: impl Iterator<Item = &'a str>,
) -> AttributeValue {
    let mut values: Vec<String> = values.map(str::to_owned).collect();
    if scalar {
        AttributeValue::Text {
            kind,
            value: values.pop().unwrap_or_default(),
        }
    } else {
        AttributeValue::Array {
            shape,
            values: ArrayValues::Text(values),
        }
    }
}

fn int_bits(size: IntSize) -> u8 {
    match size {
        IntSize::U1 => 8,
        IntSize::U2 => 16,
        IntSize::U4 => 32,
        IntSize::U8 => 64,
    }
}

fn dtype_of(descriptor: &TypeDescriptor) -> Dtype {
    match descriptor {
        TypeDescriptor::Integer(size) => Dtype::Int(int_bits(*size)),
        TypeDescriptor::Unsigned(size) => Dtype::UInt(int_bits(*size)),
        TypeDescriptor::Float(FloatSize::U4) => Dtype::Float(32),
        TypeDescriptor::Float(FloatSize::U8) => Dtype::Float(64),
        TypeDescriptor::FixedAscii(len) | TypeDescriptor::FixedUnicode(len) => {
            Dtype::FixedBytes(*len)
        },
        TypeDescriptor::VarLenAscii | TypeDescriptor::VarLenUnicode => Dtype::VarString,
        other => Dtype::Other(descriptor_name(other)),
    }
}

fn descriptor_name(descriptor: &TypeDescriptor) -> String {
    match descriptor {
        TypeDescriptor::Boolean => "bool".to_string(),
        TypeDescriptor::Enum(_) => "enum".to_string(),
        TypeDescriptor::Compound(_) => "compound".to_string(),
        TypeDescriptor::FixedArray(..) => "array".to_string(),
        TypeDescriptor::VarLenArray(_) => "vlen".to_string(),
        TypeDescriptor::Float(_) => "float".to_string(),
        _ => "other".to_string(),
    }
}
