//! Container access.
//!
//! Decoders talk to a project file through the [`Container`] trait: a tree of
//! groups and datasets addressed by `/`-separated paths relative to the
//! project root. Backends copy every value they return, so decoded data stays
//! valid after the container is closed.

#[cfg(feature = "hdf5")]
pub mod hdf5_file;
pub mod memory;

use ndarray::{ArrayD, IxDyn};
use thiserror::Error;

/// Kind of entry found at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Group with the names of its direct children.
    Group { children: Vec<String> },
    /// Dataset with its shape (empty for scalars).
    Dataset { shape: Vec<usize> },
}

pub trait Container {
    /// Look up the entry at `path`; `Ok(None)` when nothing is there.
    fn entry(&self, path: &str) -> Result<Option<Entry>, ContainerError>;

    /// Read a scalar string dataset, decoding byte strings to text.
    fn read_string(&self, path: &str) -> Result<String, ContainerError>;

    /// Read a 1-D string dataset.
    fn read_strings(&self, path: &str) -> Result<Vec<String>, ContainerError>;

    fn read_ints(&self, path: &str) -> Result<ArrayD<i64>, ContainerError>;

    fn read_floats(&self, path: &str) -> Result<ArrayD<f64>, ContainerError>;

    fn read_bools(&self, path: &str) -> Result<ArrayD<bool>, ContainerError>;

    /// Read a string attribute attached to the dataset at `path`.
    fn read_attr_string(&self, path: &str, name: &str) -> Result<String, ContainerError>;

    /// Names of the direct children of the group at `path`.
    fn children(&self, path: &str) -> Result<Vec<String>, ContainerError> {
        match self.entry(path)? {
            Some(Entry::Group { children }) => Ok(children),
            Some(Entry::Dataset { .. }) => Err(ContainerError::NotAGroup {
                path: path.to_string(),
            }),
            None => Err(ContainerError::Missing {
                path: path.to_string(),
            }),
        }
    }

    /// Whether `path` exists and holds something.
    ///
    /// A group without children counts as empty; any dataset counts as
    /// populated.
    fn is_populated(&self, path: &str) -> Result<bool, ContainerError> {
        Ok(match self.entry(path)? {
            Some(Entry::Group { children }) => !children.is_empty(),
            Some(Entry::Dataset { .. }) => true,
            None => false,
        })
    }
}

impl<C: Container + ?Sized> Container for &C {
    fn entry(&self, path: &str) -> Result<Option<Entry>, ContainerError> {
        (**self).entry(path)
    }

    fn read_string(&self, path: &str) -> Result<String, ContainerError> {
        (**self).read_string(path)
    }

    fn read_strings(&self, path: &str) -> Result<Vec<String>, ContainerError> {
        (**self).read_strings(path)
    }

    fn read_ints(&self, path: &str) -> Result<ArrayD<i64>, ContainerError> {
        (**self).read_ints(path)
    }

    fn read_floats(&self, path: &str) -> Result<ArrayD<f64>, ContainerError> {
        (**self).read_floats(path)
    }

    fn read_bools(&self, path: &str) -> Result<ArrayD<bool>, ContainerError> {
        (**self).read_bools(path)
    }

    fn read_attr_string(&self, path: &str, name: &str) -> Result<String, ContainerError> {
        (**self).read_attr_string(path, name)
    }
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] ::hdf5::Error),
    #[error("missing entry: {path}")]
    Missing { path: String },
    #[error("not a group: {path}")]
    NotAGroup { path: String },
    #[error("not a dataset: {path}")]
    NotADataset { path: String },
    #[error("missing attribute {name:?} on {path}")]
    MissingAttribute { path: String, name: String },
    #[error("type mismatch at {path}: expected {expected}")]
    TypeMismatch { path: String, expected: &'static str },
    #[error("invalid shape at {path}: {message}")]
    Shape { path: String, message: String },
}

/// Shape a flat row-major buffer read from `path`.
pub(crate) fn array_from_vec<T>(
    path: &str,
    shape: &[usize],
    data: Vec<T>,
) -> Result<ArrayD<T>, ContainerError> {
    ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|e| ContainerError::Shape {
        path: path.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn mismatch(path: &str, expected: &'static str) -> ContainerError {
    ContainerError::TypeMismatch {
        path: path.to_string(),
        expected,
    }
}

/// Split a container path into its non-empty components.
pub(crate) fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}
