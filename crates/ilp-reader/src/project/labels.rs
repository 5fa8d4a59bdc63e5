use ndarray::{Array1, Array2, Axis, Dimension, ShapeError, concatenate};
use tracing::{debug, trace};

use super::error::ProjectError;
use super::layout;
use super::reader::ProjectReader;
use super::roi::parse_start_offsets;
use crate::source::Container;
use crate::{LabelValue, Sparse};

/// Decode every `label<N>` set into one sparse volume each.
pub fn decode_label_sets<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
) -> Result<Vec<Sparse>, ProjectError> {
    let sets = reader
        .keys(layout::LABEL_SETS, layout::LABEL_SET_PREFIX)?
        .iter()
        .map(|key| decode_label_set(reader, key))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(label_sets = sets.len(), "decoded label sets");
    Ok(sets)
}

/// Decode all blocks of one label set and concatenate them.
///
/// A set without blocks decodes to [`Sparse::empty`].
pub fn decode_label_set<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
    key: &str,
) -> Result<Sparse, ProjectError> {
    let base = layout::join(&[layout::LABEL_SETS, key]);
    let blocks = reader
        .keys(&base, layout::BLOCK_PREFIX)?
        .iter()
        .map(|block| decode_label_block(reader, &layout::join(&[&base, block])))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = blocks.first() else {
        debug!(label_set = %base, "label set has no blocks");
        return Ok(Sparse::empty());
    };
    let ndim = first.ndim();
    if let Some(block) = blocks.iter().find(|block| block.ndim() != ndim) {
        return Err(ProjectError::DimensionMismatch {
            labelset: base,
            expected: ndim,
            found: block.ndim(),
        });
    }

    let mismatch = |_: ShapeError| ProjectError::DimensionMismatch {
        labelset: base.clone(),
        expected: ndim,
        found: ndim,
    };
    let coords = blocks.iter().map(|block| block.coords.view()).collect::<Vec<_>>();
    let data = blocks.iter().map(|block| block.data.view()).collect::<Vec<_>>();
    let sparse = Sparse {
        coords: concatenate(Axis(1), &coords).map_err(mismatch)?,
        data: concatenate(Axis(0), &data).map_err(mismatch)?,
    };
    debug!(
        label_set = %base,
        blocks = blocks.len(),
        points = sparse.len(),
        "decoded label set"
    );
    Ok(sparse)
}

/// Decode one dense label block into absolute coordinates.
///
/// Zero means unlabeled; every nonzero entry becomes a point, visited in
/// row-major order and shifted by the start offsets of the block's ROI.
pub fn decode_label_block<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
    path: &str,
) -> Result<Sparse, ProjectError> {
    let roi = reader.attr_string(path, layout::BLOCK_SLICE_ATTR)?;
    let offsets = parse_start_offsets(&roi).ok_or_else(|| ProjectError::MalformedBlockRoi {
        path: path.to_string(),
        roi: roi.clone(),
    })?;

    let block = reader.ints(path)?;
    let ndim = block.ndim();
    if offsets.len() != ndim {
        return Err(ProjectError::MismatchedBlockRoi {
            path: path.to_string(),
            offsets: offsets.len(),
            ndim,
        });
    }

    let mut axes: Vec<Vec<u64>> = vec![Vec::new(); ndim];
    let mut values: Vec<LabelValue> = Vec::new();
    for (index, &value) in block.indexed_iter() {
        if value == 0 {
            continue;
        }
        let value = LabelValue::try_from(value).map_err(|_| ProjectError::InvalidLabelValue {
            path: path.to_string(),
            value,
        })?;
        for ((axis, &local), &offset) in axes.iter_mut().zip(index.slice()).zip(&offsets) {
            let coord = offset.checked_add(local as u64).ok_or_else(|| {
                ProjectError::MalformedBlockRoi {
                    path: path.to_string(),
                    roi: roi.clone(),
                }
            })?;
            axis.push(coord);
        }
        values.push(value);
    }

    let points = values.len();
    trace!(block = path, roi = %roi, points, "decoded label block");
    Ok(Sparse {
        coords: Array2::from_shape_fn((ndim, points), |(axis, point)| axes[axis][point]),
        data: Array1::from(values),
    })
}

#[cfg(test)]
mod tests {
    use ndarray::{Array3, arr1, arr2};

    use super::{decode_label_block, decode_label_set, decode_label_sets};
    use crate::project::error::ProjectError;
    use crate::project::options::{KeyOrder, ReadOptions};
    use crate::project::reader::ProjectReader;
    use crate::source::memory::MemoryContainer;

    fn insert_block<D: ndarray::Dimension>(
        container: &mut MemoryContainer,
        path: &str,
        block: ndarray::Array<i64, D>,
        roi: &str,
    ) {
        container.insert_ints(path, block);
        container.set_attr(path, "blockSlice", roi).unwrap();
    }

    #[test]
    fn block_offsets_are_applied() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        insert_block(&mut container, path, arr2(&[[1, 0], [0, 2]]), "[3:5, 10:12]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let block = decode_label_block(&reader, path).unwrap();
        assert_eq!(block.coords, arr2(&[[3, 4], [10, 11]]));
        assert_eq!(block.data, arr1(&[1, 2]));
    }

    #[test]
    fn single_point_at_origin_maps_to_roi_start() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        let mut block = ndarray::Array2::<i64>::zeros((2, 10));
        block[[0, 0]] = 1;
        insert_block(&mut container, path, block, "[3:5, 10:20]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let block = decode_label_block(&reader, path).unwrap();
        assert_eq!(block.coords, arr2(&[[3], [10]]));
        assert_eq!(block.data, arr1(&[1]));
    }

    #[test]
    fn roi_must_match_block_dimensions() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        insert_block(&mut container, path, arr2(&[[1]]), "[0:1]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let err = decode_label_block(&reader, path).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::MismatchedBlockRoi {
                offsets: 1,
                ndim: 2,
                ..
            }
        ));
    }

    #[test]
    fn malformed_roi_is_rejected() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        insert_block(&mut container, path, arr2(&[[1]]), "[0:1, a:b]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let err = decode_label_block(&reader, path).unwrap_err();
        assert!(matches!(err, ProjectError::MalformedBlockRoi { .. }));
    }

    #[test]
    fn roi_offset_past_coordinate_range_is_rejected() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        insert_block(
            &mut container,
            path,
            arr2(&[[0, 1]]),
            "[0:1, 18446744073709551615:18446744073709551615]",
        );
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let err = decode_label_block(&reader, path).unwrap_err();
        assert!(matches!(err, ProjectError::MalformedBlockRoi { .. }));
    }

    #[test]
    fn negative_label_is_rejected() {
        let mut container = MemoryContainer::new();
        let path = "PixelClassification/LabelSets/labels000/block0000";
        insert_block(&mut container, path, arr2(&[[-1]]), "[0:1, 0:1]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let err = decode_label_block(&reader, path).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::InvalidLabelValue { value: -1, .. }
        ));
    }

    #[test]
    fn blocks_are_concatenated() {
        let mut container = MemoryContainer::new();
        let base = "PixelClassification/LabelSets/labels000";
        let mut first = Array3::<i64>::zeros((2, 2, 1));
        first[[0, 1, 0]] = 1;
        first[[1, 0, 0]] = 2;
        let mut second = Array3::<i64>::zeros((2, 2, 1));
        second[[1, 1, 0]] = 3;
        insert_block(&mut container, &format!("{base}/block0000"), first, "[0:2,0:2,0:1]");
        insert_block(&mut container, &format!("{base}/block0001"), second, "[10:12,20:22,0:1]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let sparse = decode_label_set(&reader, "labels000").unwrap();
        assert_eq!(sparse.coords.dim(), (3, 3));
        assert_eq!(sparse.coords, arr2(&[[0, 1, 11], [1, 0, 21], [0, 0, 0]]));
        assert_eq!(sparse.data, arr1(&[1, 2, 3]));
    }

    #[test]
    fn blocks_must_share_dimensions() {
        let mut container = MemoryContainer::new();
        let base = "PixelClassification/LabelSets/labels000";
        insert_block(&mut container, &format!("{base}/block0000"), arr2(&[[1]]), "[0:1,0:1]");
        insert_block(&mut container, &format!("{base}/block0001"), arr1(&[1]), "[0:1]");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let err = decode_label_set(&reader, "labels000").unwrap_err();
        assert!(matches!(
            err,
            ProjectError::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn label_set_without_blocks_is_empty() {
        let mut container = MemoryContainer::new();
        container.insert_group("PixelClassification/LabelSets/labels000");
        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);

        let sparse = decode_label_set(&reader, "labels000").unwrap();
        assert_eq!(sparse.coords.dim(), (0, 0));
        assert_eq!(sparse.data.len(), 0);
    }

    #[test]
    fn label_sets_and_blocks_follow_key_order() {
        let mut container = MemoryContainer::new();
        let base = "PixelClassification/LabelSets";
        insert_block(&mut container, &format!("{base}/label0/block2"), arr1(&[2]), "[2:3]");
        insert_block(&mut container, &format!("{base}/label0/block10"), arr1(&[10]), "[10:11]");
        insert_block(&mut container, &format!("{base}/label1/block0"), arr1(&[0, 7]), "[0:2]");
        container.insert_string(&format!("{base}/label0/comment"), "ignored");

        let options = ReadOptions::default();
        let reader = ProjectReader::new(&container, &options);
        let sets = decode_label_sets(&reader).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].data, arr1(&[10, 2]));
        assert_eq!(sets[1].coords, arr2(&[[1]]));

        let options = ReadOptions {
            key_order: KeyOrder::Numeric,
            ..ReadOptions::default()
        };
        let reader = ProjectReader::new(&container, &options);
        let sets = decode_label_sets(&reader).unwrap();
        assert_eq!(sets[0].data, arr1(&[2, 10]));
        assert_eq!(sets[0].coords, arr2(&[[2, 10]]));
    }
}
