use std::collections::BTreeMap;

use ndarray::{ArrayView2, Ix2};
use tracing::debug;

use super::error::ProjectError;
use super::layout;
use super::reader::ProjectReader;
use crate::source::Container;
use crate::{Class, LabelValue};

/// Decode label classes keyed by their label value.
///
/// Known labels, names and colors are parallel lists. When a label value
/// repeats, the last entry wins.
pub fn decode_classes<C: Container + ?Sized>(
    reader: &ProjectReader<'_, C>,
) -> Result<BTreeMap<LabelValue, Class>, ProjectError> {
    let field = |name: &str| layout::join(&[layout::PIXEL_CLASSIFICATION, name]);
    let labels = reader.ints(&field(layout::KNOWN_LABELS))?;
    let names = reader.strings(&field(layout::LABEL_NAMES))?;
    let colors = reader.ints(&field(layout::LABEL_COLORS))?;

    let colors = if colors.is_empty() {
        ArrayView2::<i64>::from_shape((0, layout::COLOR_CHANNELS), &[])
            .map_err(|e| invalid(e.to_string()))?
    } else {
        colors
            .view()
            .into_dimensionality::<Ix2>()
            .ok()
            .filter(|view| view.ncols() == layout::COLOR_CHANNELS)
            .ok_or_else(|| {
                invalid(format!(
                    "colors have shape {:?}, expected (n, {})",
                    colors.shape(),
                    layout::COLOR_CHANNELS
                ))
            })?
    };

    if labels.len() != names.len() || names.len() != colors.nrows() {
        return Err(invalid(format!(
            "{} labels, {} names, {} colors",
            labels.len(),
            names.len(),
            colors.nrows()
        )));
    }

    let mut classes = BTreeMap::new();
    for ((&label, name), color) in labels.iter().zip(names).zip(colors.rows()) {
        let label = LabelValue::try_from(label)
            .map_err(|_| invalid(format!("label value {label} out of range")))?;
        let rgb = [
            channel(color[0])?,
            channel(color[1])?,
            channel(color[2])?,
        ];
        classes.insert(label, Class::from_rgb(name, rgb));
    }
    debug!(classes = classes.len(), "decoded classes");
    Ok(classes)
}

fn channel(value: i64) -> Result<u8, ProjectError> {
    u8::try_from(value).map_err(|_| invalid(format!("color channel {value} out of range")))
}

fn invalid(reason: String) -> ProjectError {
    ProjectError::InvalidClassAttributes { reason }
}
