use thiserror::Error;

use crate::source::ContainerError;

/// Errors returned while decoding a project.
///
/// # Examples
/// ```
/// use ilp_reader::ProjectError;
///
/// let err = ProjectError::UnsupportedWorkflow {
///     found: "Object Classification".to_string(),
/// };
/// assert!(err.to_string().contains("Object Classification"));
/// ```
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("unsupported workflow: {found:?}")]
    UnsupportedWorkflow { found: String },
    #[error("invalid input metadata at {path}: {reason}")]
    InvalidInputMeta { path: String, reason: String },
    #[error(
        "invalid feature attributes: selection matrix {matrix:?}, {names} names, {scales} scales, {flags} 2d flags"
    )]
    InvalidFeatureAttributes {
        matrix: Vec<usize>,
        names: usize,
        scales: usize,
        flags: usize,
    },
    #[error("invalid class attributes: {reason}")]
    InvalidClassAttributes { reason: String },
    #[error("malformed block ROI at {path}: {roi:?}")]
    MalformedBlockRoi { path: String, roi: String },
    #[error("cannot match label block {path} with its ROI: {offsets} offsets for {ndim} dimensions")]
    MismatchedBlockRoi {
        path: String,
        offsets: usize,
        ndim: usize,
    },
    #[error("label blocks in {labelset} have different dimension counts: {expected} and {found}")]
    DimensionMismatch {
        labelset: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid label value {value} in {path}")]
    InvalidLabelValue { path: String, value: i64 },
}
