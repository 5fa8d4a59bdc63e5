#[cfg(feature = "hdf5")]
use std::path::Path;

use tracing::{debug, info_span};

use crate::Project;
use crate::source::Container;

mod classes;
mod error;
mod features;
mod labels;
mod lanes;
mod layout;
mod options;
mod reader;
mod roi;

pub use error::ProjectError;
pub use options::{KeyOrder, ReadOptions};

use classes::decode_classes;
use features::decode_features;
use labels::decode_label_sets;
use lanes::decode_lanes;
use reader::ProjectReader;

/// Value of `workflowName` accepted by the reader.
pub const SUPPORTED_WORKFLOW: &str = layout::PIXEL_CLASSIFICATION_WORKFLOW;

/// Decode a project with default [`ReadOptions`].
pub fn read_project<C: Container + ?Sized>(container: &C) -> Result<Project, ProjectError> {
    read_project_with(container, &ReadOptions::default())
}

/// Decode a project.
///
/// The workflow name is checked before anything else is read; the result is
/// either a complete [`Project`] or the first error encountered.
pub fn read_project_with<C: Container + ?Sized>(
    container: &C,
    options: &ReadOptions,
) -> Result<Project, ProjectError> {
    let _span = info_span!("read_project", key_order = ?options.key_order).entered();
    let reader = ProjectReader::new(container, options);

    let workflow = reader.string(layout::WORKFLOW_NAME)?;
    if workflow != SUPPORTED_WORKFLOW {
        return Err(ProjectError::UnsupportedWorkflow { found: workflow });
    }

    let time = reader.string(layout::TIME)?;
    let ilastik_version = reader.string(layout::ILASTIK_VERSION)?;
    debug!(time = %time, ilastik_version = %ilastik_version, "decoded project header");

    Ok(Project {
        time,
        ilastik_version,
        lanes: decode_lanes(&reader)?,
        features: decode_features(&reader)?,
        classes: decode_classes(&reader)?,
        labels: decode_label_sets(&reader)?,
    })
}

/// Open an HDF5 project file and decode it with default [`ReadOptions`].
#[cfg(feature = "hdf5")]
pub fn read_project_file(path: &Path) -> Result<Project, ProjectError> {
    read_project_file_with(path, &ReadOptions::default())
}

/// Open an HDF5 project file and decode it.
///
/// The file handle is released before this returns.
#[cfg(feature = "hdf5")]
pub fn read_project_file_with(path: &Path, options: &ReadOptions) -> Result<Project, ProjectError> {
    let container = crate::source::hdf5_file::Hdf5Container::open(path)?;
    read_project_with(&container, options)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ndarray::{arr1, arr2};

    use super::{ProjectError, SUPPORTED_WORKFLOW, read_project};
    use crate::source::ContainerError;
    use crate::source::memory::{MemoryContainer, Node};

    const AXIS_TAGS_YX: &str = r#"{"axes": [{"key": "y"}, {"key": "x"}]}"#;

    fn minimal_project() -> MemoryContainer {
        let mut container = MemoryContainer::new();
        container.insert_string("workflowName", SUPPORTED_WORKFLOW);
        container.insert_string("time", "Mon Dec  2 11:21:31 2019");
        container.insert_string("ilastikVersion", "1.3.3post1");

        let raw = "Input Data/infos/lane0/Raw Data";
        container.insert_string(&format!("{raw}/axistags"), AXIS_TAGS_YX);
        container.insert_string(&format!("{raw}/location"), "FileSystem");
        container.insert_string(&format!("{raw}/filePath"), "input.png");
        container.insert_string(&format!("{raw}/datasetId"), "uuid");
        container.insert_string(&format!("{raw}/nickname"), "input");
        container.insert_ints(&format!("{raw}/shape"), arr1(&[4i64, 4]));

        container.insert_bools("FeatureSelections/SelectionMatrix", arr2(&[[true]]));
        container.insert_strings("FeatureSelections/FeatureIds", ["GaussianSmoothing"]);
        container.insert_floats("FeatureSelections/Scales", arr1(&[1.0]));
        container.insert_bools("FeatureSelections/ComputeIn2d", arr1(&[true]));

        container.insert_ints(
            "PixelClassification/ClassifierForests/known_labels",
            arr1(&[1i64]),
        );
        container.insert_strings("PixelClassification/LabelNames", ["Background"]);
        container.insert_ints("PixelClassification/LabelColors", arr2(&[[0i64, 0, 255]]));

        let block = "PixelClassification/LabelSets/labels000/block0000";
        container.insert_ints(block, arr2(&[[0i64, 1], [0, 0]]));
        container.set_attr(block, "blockSlice", "[2:4,2:4]").unwrap();
        container
    }

    #[test]
    fn reads_minimal_project() {
        let project = read_project(&minimal_project()).unwrap();
        assert_eq!(project.ilastik_version, "1.3.3post1");
        assert_eq!(project.lanes.len(), 1);
        assert_eq!(project.features.len(), 1);
        assert_eq!(project.classes[&1].color, "#0000ff");
        assert_eq!(project.labels.len(), 1);
        assert_eq!(project.labels[0].coords, arr2(&[[2], [3]]));
    }

    #[test]
    fn rejects_other_workflows_first() {
        let mut container = MemoryContainer::new();
        container.insert_string("workflowName", "Object Classification");

        let err = read_project(&container).unwrap_err();
        match err {
            ProjectError::UnsupportedWorkflow { found } => {
                assert_eq!(found, "Object Classification")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_section_fails_the_whole_read() {
        let mut container = minimal_project();
        container.insert("FeatureSelections", Node::Group(BTreeMap::new()));

        let err = read_project(&container).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Container(ContainerError::Missing { .. })
        ));
    }
}
