use std::collections::BTreeSet;

use ndarray::Ix2;
use tracing::debug;

use super::error::ProjectError;
use super::layout;
use super::reader::ProjectReader;
use crate::source::Container;
use crate::{Feature, FeatureDims};

/// Decode the feature selection matrix.
///
/// Rows are feature types, columns are scales; every selected cell yields one
/// feature. The `ComputeIn2d` flag of the column decides between 2-D and 3-D.
pub fn decode_features<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
) -> Result<BTreeSet<Feature>, ProjectError> {
    let field = |name: &str| layout::join(&[layout::FEATURE_SELECTIONS, name]);
    let matrix = reader.bools(&field(layout::SELECTION_MATRIX))?;
    let names = reader.strings(&field(layout::FEATURE_IDS))?;
    let scales = reader.floats(&field(layout::SCALES))?;
    let in_2d = reader.bools(&field(layout::COMPUTE_IN_2D))?;

    let invalid = || ProjectError::InvalidFeatureAttributes {
        matrix: matrix.shape().to_vec(),
        names: names.len(),
        scales: scales.len(),
        flags: in_2d.len(),
    };
    let selections = matrix
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| invalid())?;
    if selections.dim() != (names.len(), scales.len()) || scales.len() != in_2d.len() {
        return Err(invalid());
    }

    let scales: Vec<f64> = scales.iter().copied().collect();
    let dims: Vec<FeatureDims> = in_2d
        .iter()
        .map(|&planar| if planar { FeatureDims::Xy } else { FeatureDims::Xyz })
        .collect();

    let features: BTreeSet<Feature> = selections
        .indexed_iter()
        .filter(|(_, selected)| **selected)
        .map(|((row, col), _)| Feature::new(names[row].clone(), scales[col], dims[col]))
        .collect();
    debug!(features = features.len(), "decoded features");
    Ok(features)
}
