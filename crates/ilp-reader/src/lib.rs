//! Reader for ilastik pixel classification project files (`.ilp`).
//!
//! A project file is an HDF5 container. This crate decodes the parts of it
//! that describe the machine-learning project: input image references per
//! lane, selected features, label classes, and the sparse label annotations
//! drawn by the user. Pixel data referenced by the inputs is never loaded.
//!
//! Container access is isolated in `source`: decoders only see the
//! [`Container`] trait, so any backend that can list groups and read datasets
//! works. The in-memory [`MemoryContainer`] is always available.
//!
//! Reading a `.ilp` file from a path needs the `hdf5` cargo feature, which
//! links the system HDF5 library and enables `read_project_file`,
//! `read_project_file_with` and `Hdf5Container`:
//!
//! ```toml
//! ilp-reader = { version = "0.1", features = ["hdf5"] }
//! ```
//!
//! Invariants:
//! - A project either decodes completely or the read fails; there are no
//!   partial results.
//! - Decoded values own their data and do not borrow from the container.
//! - Output ordering is deterministic (features and classes are ordered).
//!
//! # Examples
//! ```
//! use ilp_reader::{MemoryContainer, ProjectError, read_project};
//!
//! let mut container = MemoryContainer::new();
//! container.insert_string("workflowName", "Object Classification");
//!
//! let err = read_project(&container).unwrap_err();
//! assert!(matches!(err, ProjectError::UnsupportedWorkflow { .. }));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

mod project;
mod source;

pub use project::{
    KeyOrder, ProjectError, ReadOptions, SUPPORTED_WORKFLOW, read_project, read_project_with,
};
#[cfg(feature = "hdf5")]
pub use project::{read_project_file, read_project_file_with};
#[cfg(feature = "hdf5")]
pub use source::hdf5_file::Hdf5Container;
pub use source::memory::{MemoryContainer, Node, Value};
pub use source::{Container, ContainerError, Entry};

/// Label value as stored in label blocks and class tables.
pub type LabelValue = u32;

/// Decoded pixel classification project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Creation time as written by ilastik (ctime layout).
    pub time: String,
    /// Version of ilastik that wrote the file.
    pub ilastik_version: String,
    /// Input lanes in key order.
    pub lanes: Vec<Lane>,
    /// Selected features.
    pub features: BTreeSet<Feature>,
    /// Label classes keyed by label value.
    pub classes: BTreeMap<LabelValue, Class>,
    /// One sparse label volume per label set.
    pub labels: Vec<Sparse>,
}

impl Project {
    /// Parse [`Project::time`] (`"Mon Dec  2 11:21:31 2019"`).
    ///
    /// Returns `None` when the string does not follow the ctime layout.
    ///
    /// # Examples
    /// ```
    /// use std::collections::{BTreeMap, BTreeSet};
    ///
    /// use ilp_reader::Project;
    ///
    /// let project = Project {
    ///     time: "Mon Dec  2 11:21:31 2019".to_string(),
    ///     ilastik_version: "1.3.3post1".to_string(),
    ///     lanes: Vec::new(),
    ///     features: BTreeSet::new(),
    ///     classes: BTreeMap::new(),
    ///     labels: Vec::new(),
    /// };
    /// let created = project.created_at().unwrap();
    /// assert_eq!(created.year(), 2019);
    /// assert_eq!(created.day(), 2);
    /// ```
    pub fn created_at(&self) -> Option<PrimitiveDateTime> {
        let layout = format_description!(
            "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
        );
        PrimitiveDateTime::parse(self.time.trim(), layout).ok()
    }
}

/// One input lane: a source image and an optional prediction mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    /// Metadata of the "Raw Data" role, if configured.
    pub source: Option<InputMeta>,
    /// Metadata of the "Prediction Mask" role, if configured.
    pub mask: Option<InputMeta>,
}

/// Description of one input referenced by a lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputMeta {
    /// Stable dataset identifier (UUID string).
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Per-axis sizes.
    pub shape: Vec<u64>,
    /// Axis tags, one per shape dimension (e.g. `['y', 'x', 'c']`).
    pub dims: Vec<char>,
    /// Where the data is stored.
    pub location: Location,
    /// File path, internal container path, or empty for other locations.
    pub path: String,
}

/// Storage location of an input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Location {
    /// Data lives on the filesystem; the path is a file path.
    FileSystem,
    /// Data is embedded in the project; the path is an internal path.
    ProjectInternal,
    /// Any other location value, kept verbatim.
    Other(String),
}

impl Location {
    /// Map the raw `location` value.
    ///
    /// # Examples
    /// ```
    /// use ilp_reader::Location;
    ///
    /// assert_eq!(Location::from_raw("FileSystem"), Location::FileSystem);
    /// assert_eq!(
    ///     Location::from_raw("Cloud"),
    ///     Location::Other("Cloud".to_string())
    /// );
    /// ```
    pub fn from_raw(value: &str) -> Self {
        match value {
            "FileSystem" => Location::FileSystem,
            "ProjectInternal" => Location::ProjectInternal,
            other => Location::Other(other.to_string()),
        }
    }

    /// Raw value as written in the project file.
    pub fn as_str(&self) -> &str {
        match self {
            Location::FileSystem => "FileSystem",
            Location::ProjectInternal => "ProjectInternal",
            Location::Other(value) => value,
        }
    }
}

/// Spatial axes a feature is computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDims {
    /// Computed per 2-D slice.
    Xy,
    /// Computed in 3-D.
    Xyz,
}

impl FeatureDims {
    /// Axis tags covered by this dimensionality.
    ///
    /// # Examples
    /// ```
    /// use ilp_reader::FeatureDims;
    ///
    /// assert_eq!(FeatureDims::Xy.axes(), &['x', 'y']);
    /// assert_eq!(FeatureDims::Xyz.axes().len(), 3);
    /// ```
    pub fn axes(self) -> &'static [char] {
        match self {
            FeatureDims::Xy => &['x', 'y'],
            FeatureDims::Xyz => &['x', 'y', 'z'],
        }
    }
}

/// One selected image feature.
///
/// Equality, hashing and ordering compare `scale` bitwise (via
/// [`f64::total_cmp`]) so features can live in sets.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    /// Feature type (e.g. `"GaussianSmoothing"`).
    pub name: String,
    /// Filter scale (sigma).
    pub scale: f64,
    /// Axes the feature is computed in.
    pub dims: FeatureDims,
}

impl Feature {
    pub fn new(name: impl Into<String>, scale: f64, dims: FeatureDims) -> Self {
        Self {
            name: name.into(),
            scale,
            dims,
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Feature {}

impl PartialOrd for Feature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Feature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.scale.total_cmp(&other.scale))
            .then_with(|| self.dims.cmp(&other.dims))
    }
}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.scale.to_bits().hash(state);
        self.dims.hash(state);
    }
}

/// Label class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Class {
    /// Display name.
    pub name: String,
    /// Color as `#rrggbb`.
    pub color: String,
}

impl Class {
    /// Build a class from 8-bit color channels.
    ///
    /// # Examples
    /// ```
    /// use ilp_reader::Class;
    ///
    /// let class = Class::from_rgb("Background", [255, 225, 25]);
    /// assert_eq!(class.color, "#ffe119");
    /// ```
    pub fn from_rgb(name: impl Into<String>, [r, g, b]: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color: format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// Sparse label volume in coordinate format.
///
/// `coords` has one row per axis and one column per labeled point; `data`
/// holds the label value of each column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparse {
    pub coords: Array2<u64>,
    pub data: Array1<LabelValue>,
}

impl Sparse {
    /// Volume without axes or points.
    ///
    /// # Examples
    /// ```
    /// use ilp_reader::Sparse;
    ///
    /// let sparse = Sparse::empty();
    /// assert_eq!(sparse.coords.dim(), (0, 0));
    /// assert!(sparse.is_empty());
    /// ```
    pub fn empty() -> Self {
        Self {
            coords: Array2::zeros((0, 0)),
            data: Array1::zeros(0),
        }
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.coords.nrows()
    }

    /// Number of labeled points.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate `(coordinate, label)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, u64>, LabelValue)> + '_ {
        self.coords.columns().into_iter().zip(self.data.iter().copied())
    }
}
