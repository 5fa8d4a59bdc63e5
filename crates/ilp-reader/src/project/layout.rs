//! Key layout of a pixel classification project file.

pub const WORKFLOW_NAME: &str = "workflowName";
pub const TIME: &str = "time";
pub const ILASTIK_VERSION: &str = "ilastikVersion";

pub const PIXEL_CLASSIFICATION_WORKFLOW: &str = "Pixel Classification";

pub const LANE_INFOS: &str = "Input Data/infos";
pub const LANE_PREFIX: &str = "lane";
pub const ROLE_RAW_DATA: &str = "Raw Data";
pub const ROLE_PREDICTION_MASK: &str = "Prediction Mask";

pub const AXIS_TAGS: &str = "axistags";
pub const LOCATION: &str = "location";
pub const FILE_PATH: &str = "filePath";
pub const INNER_PATH: &str = "inner_path";
pub const DATASET_ID: &str = "datasetId";
pub const NICKNAME: &str = "nickname";
pub const SHAPE: &str = "shape";

pub const LOCATION_FILE_SYSTEM: &str = "FileSystem";
pub const LOCATION_PROJECT_INTERNAL: &str = "ProjectInternal";

pub const FEATURE_SELECTIONS: &str = "FeatureSelections";
pub const SELECTION_MATRIX: &str = "SelectionMatrix";
pub const FEATURE_IDS: &str = "FeatureIds";
pub const SCALES: &str = "Scales";
pub const COMPUTE_IN_2D: &str = "ComputeIn2d";

pub const PIXEL_CLASSIFICATION: &str = "PixelClassification";
pub const KNOWN_LABELS: &str = "ClassifierForests/known_labels";
pub const LABEL_NAMES: &str = "LabelNames";
pub const LABEL_COLORS: &str = "LabelColors";
pub const COLOR_CHANNELS: usize = 3;

pub const LABEL_SETS: &str = "PixelClassification/LabelSets";
pub const LABEL_SET_PREFIX: &str = "label";
pub const BLOCK_PREFIX: &str = "block";
pub const BLOCK_SLICE_ATTR: &str = "blockSlice";

/// Join container path segments with `/`.
pub fn join(parts: &[&str]) -> String {
    parts.join("/")
}
