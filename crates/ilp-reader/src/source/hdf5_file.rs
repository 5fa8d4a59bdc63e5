//! HDF5 container backed by `hdf5-metno`.
//!
//! Strings are accepted in any of the layouts h5py produces (fixed or
//! variable length, ASCII or UTF-8). Booleans are accepted as HDF5 enums or
//! as integers.

use std::path::Path;

use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File};
use ndarray::ArrayD;

use super::{Container, ContainerError, Entry, array_from_vec, mismatch, path_components};

/// Capacity used when reading fixed-length strings.
const FIXED_STRING_CAPACITY: usize = 4096;

/// Read-only handle on an HDF5 file. The file is closed on drop.
pub struct Hdf5Container {
    file: File,
}

impl Hdf5Container {
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let file = File::open(path)?;
        Ok(Self { file })
    }

    pub fn from_file(file: File) -> Self {
        Self { file }
    }

    fn dataset(&self, path: &str) -> Result<Dataset, ContainerError> {
        match self.entry(path)? {
            Some(Entry::Dataset { .. }) => Ok(self.file.dataset(path)?),
            Some(Entry::Group { .. }) => Err(ContainerError::NotADataset {
                path: path.to_string(),
            }),
            None => Err(ContainerError::Missing {
                path: path.to_string(),
            }),
        }
    }
}

impl Container for Hdf5Container {
    fn entry(&self, path: &str) -> Result<Option<Entry>, ContainerError> {
        if path_components(path).next().is_none() {
            return Ok(Some(Entry::Group {
                children: self.file.member_names()?,
            }));
        }
        if !self.file.link_exists(path) {
            return Ok(None);
        }
        if let Ok(group) = self.file.group(path) {
            return Ok(Some(Entry::Group {
                children: group.member_names()?,
            }));
        }
        let dataset = self.file.dataset(path)?;
        Ok(Some(Entry::Dataset {
            shape: dataset.shape(),
        }))
    }

    fn read_string(&self, path: &str) -> Result<String, ContainerError> {
        let dataset = self.dataset(path)?;
        scalar_string(path, &dataset)
    }

    fn read_strings(&self, path: &str) -> Result<Vec<String>, ContainerError> {
        let dataset = self.dataset(path)?;
        let values = match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::VarLenUnicode => collect_strings(dataset.read_raw::<VarLenUnicode>()?),
            TypeDescriptor::VarLenAscii => collect_strings(dataset.read_raw::<VarLenAscii>()?),
            TypeDescriptor::FixedAscii(len) => {
                check_fixed_len(path, len)?;
                collect_strings(dataset.read_raw::<FixedAscii<FIXED_STRING_CAPACITY>>()?)
            }
            TypeDescriptor::FixedUnicode(len) => {
                check_fixed_len(path, len)?;
                collect_strings(dataset.read_raw::<FixedUnicode<FIXED_STRING_CAPACITY>>()?)
            }
            _ => return Err(mismatch(path, "string array")),
        };
        Ok(values)
    }

    fn read_ints(&self, path: &str) -> Result<ArrayD<i64>, ContainerError> {
        let dataset = self.dataset(path)?;
        match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
                array_from_vec(path, &dataset.shape(), dataset.read_raw::<i64>()?)
            }
            _ => Err(mismatch(path, "integer array")),
        }
    }

    fn read_floats(&self, path: &str) -> Result<ArrayD<f64>, ContainerError> {
        let dataset = self.dataset(path)?;
        match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::Float(_) | TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
                array_from_vec(path, &dataset.shape(), dataset.read_raw::<f64>()?)
            }
            _ => Err(mismatch(path, "float array")),
        }
    }

    fn read_bools(&self, path: &str) -> Result<ArrayD<bool>, ContainerError> {
        let dataset = self.dataset(path)?;
        let data = match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => dataset.read_raw::<bool>()?,
            TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => dataset
                .read_raw::<i64>()?
                .into_iter()
                .map(|value| value != 0)
                .collect(),
            _ => return Err(mismatch(path, "boolean array")),
        };
        array_from_vec(path, &dataset.shape(), data)
    }

    fn read_attr_string(&self, path: &str, name: &str) -> Result<String, ContainerError> {
        let dataset = self.dataset(path)?;
        if !dataset.attr_names()?.iter().any(|attr| attr == name) {
            return Err(ContainerError::MissingAttribute {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        let attr = dataset.attr(name)?;
        scalar_string(path, &attr)
    }
}

fn scalar_string(path: &str, data: &hdf5::Container) -> Result<String, ContainerError> {
    let text = match data.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenUnicode => data.read_scalar::<VarLenUnicode>()?.as_str().to_owned(),
        TypeDescriptor::VarLenAscii => data.read_scalar::<VarLenAscii>()?.as_str().to_owned(),
        TypeDescriptor::FixedAscii(len) => {
            check_fixed_len(path, len)?;
            data.read_scalar::<FixedAscii<FIXED_STRING_CAPACITY>>()?
                .as_str()
                .to_owned()
        }
        TypeDescriptor::FixedUnicode(len) => {
            check_fixed_len(path, len)?;
            data.read_scalar::<FixedUnicode<FIXED_STRING_CAPACITY>>()?
                .as_str()
                .to_owned()
        }
        _ => return Err(mismatch(path, "string")),
    };
    Ok(text)
}

/// Fixed-length strings are read into a buffer of [`FIXED_STRING_CAPACITY`]
/// bytes; longer ones would be truncated by the conversion.
fn check_fixed_len(path: &str, len: usize) -> Result<(), ContainerError> {
    if len > FIXED_STRING_CAPACITY {
        return Err(ContainerError::Shape {
            path: path.to_string(),
            message: format!(
                "fixed-length string of {len} bytes exceeds {FIXED_STRING_CAPACITY} bytes"
            ),
        });
    }
    Ok(())
}

fn collect_strings<S: AsRef<str>>(values: Vec<S>) -> Vec<String> {
    values
        .iter()
        .map(|value| value.as_ref().to_owned())
        .collect()
}
