use serde::Deserialize;
use tracing::debug;

use super::error::ProjectError;
use super::layout;
use super::reader::ProjectReader;
use crate::source::Container;
use crate::{InputMeta, Lane, Location};

#[derive(Deserialize)]
struct AxisTags {
    axes: Vec<AxisTag>,
}

#[derive(Deserialize)]
struct AxisTag {
    key: String,
}

/// Decode every `lane<N>` entry of the input infos group.
pub fn decode_lanes<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
) -> Result<Vec<Lane>, ProjectError> {
    let lanes = reader
        .keys(layout::LANE_INFOS, layout::LANE_PREFIX)?
        .iter()
        .map(|lane| {
            Ok::<_, ProjectError>(Lane {
                source: decode_input_meta(reader, lane, layout::ROLE_RAW_DATA)?,
                mask: decode_input_meta(reader, lane, layout::ROLE_PREDICTION_MASK)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(lanes = lanes.len(), "decoded lanes");
    Ok(lanes)
}

/// Decode one role of one lane.
///
/// Returns `Ok(None)` when the role is absent or an empty group.
pub fn decode_input_meta<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
    lane: &str,
    role: &str,
) -> Result<Option<InputMeta>, ProjectError> {
    let base = layout::join(&[layout::LANE_INFOS, lane, role]);
    if !reader.is_populated(&base)? {
        return Ok(None);
    }
    let field = |name: &str| layout::join(&[&base, name]);

    let axis_tags_path = field(layout::AXIS_TAGS);
    let dims = parse_axis_tags(&axis_tags_path, &reader.string(&axis_tags_path)?)?;

    let location = reader.string(&field(layout::LOCATION))?;
    let path = match location.as_str() {
        layout::LOCATION_FILE_SYSTEM => reader.string(&field(layout::FILE_PATH))?,
        layout::LOCATION_PROJECT_INTERNAL => reader.string(&field(layout::INNER_PATH))?,
        _ => String::new(),
    };

    let shape_path = field(layout::SHAPE);
    let shape = reader
        .ints(&shape_path)?
        .iter()
        .map(|&size| {
            u64::try_from(size).map_err(|_| ProjectError::InvalidInputMeta {
                path: shape_path.clone(),
                reason: format!("negative axis size {size}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if reader.options().check_axes && dims.len() != shape.len() {
        return Err(ProjectError::InvalidInputMeta {
            path: base.clone(),
            reason: format!(
                "{} axis tags for a {}-dimensional shape",
                dims.len(),
                shape.len()
            ),
        });
    }

    Ok(Some(InputMeta {
        uuid: reader.string(&field(layout::DATASET_ID))?,
        name: reader.string(&field(layout::NICKNAME))?,
        shape,
        dims,
        location: Location::from_raw(&location),
        path,
    }))
}

/// Extract the axis keys from serialized axistags.
fn parse_axis_tags(path: &str, text: &str) -> Result<Vec<char>, ProjectError> {
    let invalid = |reason: String| ProjectError::InvalidInputMeta {
        path: path.to_string(),
        reason,
    };
    let tags: AxisTags =
        serde_json::from_str(text).map_err(|e| invalid(format!("invalid axistags: {e}")))?;
    tags.axes
        .into_iter()
        .map(|axis| {
            let mut chars = axis.key.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => Ok(key),
                _ => Err(invalid(format!("axis key {:?} is not one character", axis.key))),
            }
        })
        .collect()
}
