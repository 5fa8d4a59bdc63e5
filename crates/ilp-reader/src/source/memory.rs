//! In-memory container.
//!
//! The tree can be built in code with the `insert_*` methods or deserialized
//! from JSON, where every node is either `{"group": {...}}` or
//! `{"dataset": {"value": {...}, "attrs": {...}}}`:
//!
//! ```json
//! {
//!   "workflowName": {"dataset": {"value": {"type": "string", "value": "Pixel Classification"}}},
//!   "FeatureSelections": {"group": {
//!     "Scales": {"dataset": {"value": {"type": "float", "shape": [2], "data": [0.3, 1.0]}}}
//!   }}
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ndarray::{Array, ArrayD, Dimension};
use serde::{Deserialize, Serialize};

use super::{Container, ContainerError, Entry, array_from_vec, mismatch, path_components};

/// Node of a [`MemoryContainer`] tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Group(BTreeMap<String, Node>),
    Dataset {
        value: Value,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
    },
}

/// Dataset payload. Arrays are stored flat in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Value {
    String { value: String },
    Strings { values: Vec<String> },
    Int { shape: Vec<usize>, data: Vec<i64> },
    Float { shape: Vec<usize>, data: Vec<f64> },
    Bool { shape: Vec<usize>, data: Vec<bool> },
}

impl Value {
    fn shape(&self) -> Vec<usize> {
        match self {
            Value::String { .. } => Vec::new(),
            Value::Strings { values } => vec![values.len()],
            Value::Int { shape, .. } | Value::Float { shape, .. } | Value::Bool { shape, .. } => {
                shape.clone()
            }
        }
    }
}

/// Container holding its whole tree in memory.
///
/// # Examples
/// ```
/// use ilp_reader::{Container, MemoryContainer};
///
/// let mut container = MemoryContainer::new();
/// container.insert_string("time", "Mon Dec  2 11:21:31 2019");
/// assert_eq!(container.read_string("time").unwrap(), "Mon Dec  2 11:21:31 2019");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryContainer {
    root: BTreeMap<String, Node>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON tree description.
    pub fn from_json_str(json: &str) -> Result<Self, ContainerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON tree description from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, ContainerError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Insert `node` at `path`, creating intermediate groups.
    ///
    /// Existing entries on the way that are not groups are replaced by
    /// groups. An empty path is ignored.
    pub fn insert(&mut self, path: &str, node: Node) {
        let parts: Vec<&str> = path_components(path).collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };
        let mut group = &mut self.root;
        for part in parents {
            let entry = group
                .entry((*part).to_string())
                .or_insert_with(|| Node::Group(BTreeMap::new()));
            if let Node::Dataset { .. } = entry {
                *entry = Node::Group(BTreeMap::new());
            }
            let Node::Group(children) = entry else {
                return;
            };
            group = children;
        }
        group.insert((*last).to_string(), node);
    }

    /// Insert an empty group at `path` unless a group is already there.
    pub fn insert_group(&mut self, path: &str) {
        if !matches!(self.node(path), Some(Node::Group(_))) {
            self.insert(path, Node::Group(BTreeMap::new()));
        }
    }

    pub fn insert_value(&mut self, path: &str, value: Value) {
        self.insert(
            path,
            Node::Dataset {
                value,
                attrs: BTreeMap::new(),
            },
        );
    }

    pub fn insert_string(&mut self, path: &str, value: impl Into<String>) {
        self.insert_value(
            path,
            Value::String {
                value: value.into(),
            },
        );
    }

    pub fn insert_strings<I, S>(&mut self, path: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert_value(path, Value::Strings { values });
    }

    pub fn insert_ints<D: Dimension>(&mut self, path: &str, array: Array<i64, D>) {
        let (shape, data) = flatten(array);
        self.insert_value(path, Value::Int { shape, data });
    }

    pub fn insert_floats<D: Dimension>(&mut self, path: &str, array: Array<f64, D>) {
        let (shape, data) = flatten(array);
        self.insert_value(path, Value::Float { shape, data });
    }

    pub fn insert_bools<D: Dimension>(&mut self, path: &str, array: Array<bool, D>) {
        let (shape, data) = flatten(array);
        self.insert_value(path, Value::Bool { shape, data });
    }

    /// Attach a string attribute to the dataset at `path`.
    pub fn set_attr(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ContainerError> {
        match self.node_mut(path) {
            Some(Node::Dataset { attrs, .. }) => {
                attrs.insert(name.to_string(), value.into());
                Ok(())
            }
            Some(Node::Group(_)) => Err(ContainerError::NotADataset {
                path: path.to_string(),
            }),
            None => Err(ContainerError::Missing {
                path: path.to_string(),
            }),
        }
    }

    fn node(&self, path: &str) -> Option<&Node> {
        let mut parts = path_components(path);
        let mut node = self.root.get(parts.next()?)?;
        for part in parts {
            node = match node {
                Node::Group(children) => children.get(part)?,
                Node::Dataset { .. } => return None,
            };
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut parts = path_components(path);
        let mut node = self.root.get_mut(parts.next()?)?;
        for part in parts {
            node = match node {
                Node::Group(children) => children.get_mut(part)?,
                Node::Dataset { .. } => return None,
            };
        }
        Some(node)
    }

    fn value(&self, path: &str) -> Result<&Value, ContainerError> {
        match self.node(path) {
            Some(Node::Dataset { value, .. }) => Ok(value),
            Some(Node::Group(_)) => Err(ContainerError::NotADataset {
                path: path.to_string(),
            }),
            None => Err(ContainerError::Missing {
                path: path.to_string(),
            }),
        }
    }
}

impl Container for MemoryContainer {
    fn entry(&self, path: &str) -> Result<Option<Entry>, ContainerError> {
        if path_components(path).next().is_none() {
            return Ok(Some(Entry::Group {
                children: self.root.keys().cloned().collect(),
            }));
        }
        Ok(self.node(path).map(|node| match node {
            Node::Group(children) => Entry::Group {
                children: children.keys().cloned().collect(),
            },
            Node::Dataset { value, .. } => Entry::Dataset {
                shape: value.shape(),
            },
        }))
    }

    fn read_string(&self, path: &str) -> Result<String, ContainerError> {
        match self.value(path)? {
            Value::String { value } => Ok(value.clone()),
            _ => Err(mismatch(path, "string")),
        }
    }

    fn read_strings(&self, path: &str) -> Result<Vec<String>, ContainerError> {
        match self.value(path)? {
            Value::Strings { values } => Ok(values.clone()),
            _ => Err(mismatch(path, "string array")),
        }
    }

    fn read_ints(&self, path: &str) -> Result<ArrayD<i64>, ContainerError> {
        match self.value(path)? {
            Value::Int { shape, data } => array_from_vec(path, shape, data.clone()),
            _ => Err(mismatch(path, "integer array")),
        }
    }

    fn read_floats(&self, path: &str) -> Result<ArrayD<f64>, ContainerError> {
        match self.value(path)? {
            Value::Float { shape, data } => array_from_vec(path, shape, data.clone()),
            Value::Int { shape, data } => {
                array_from_vec(path, shape, data.iter().map(|&v| v as f64).collect())
            }
            _ => Err(mismatch(path, "float array")),
        }
    }

    fn read_bools(&self, path: &str) -> Result<ArrayD<bool>, ContainerError> {
        match self.value(path)? {
            Value::Bool { shape, data } => array_from_vec(path, shape, data.clone()),
            _ => Err(mismatch(path, "boolean array")),
        }
    }

    fn read_attr_string(&self, path: &str, name: &str) -> Result<String, ContainerError> {
        match self.node(path) {
            Some(Node::Dataset { attrs, .. }) => {
                attrs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ContainerError::MissingAttribute {
                        path: path.to_string(),
                        name: name.to_string(),
                    })
            }
            Some(Node::Group(_)) => Err(ContainerError::MissingAttribute {
                path: path.to_string(),
                name: name.to_string(),
            }),
            None => Err(ContainerError::Missing {
                path: path.to_string(),
            }),
        }
    }
}

fn flatten<T: Clone, D: Dimension>(array: Array<T, D>) -> (Vec<usize>, Vec<T>) {
    let shape = array.shape().to_vec();
    let data = array.iter().cloned().collect();
    (shape, data)
}
