use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Order in which numbered children (`lane0`, `label1`, `block10`, ...) are
/// visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Plain string order, as ilastik itself lists them (`lane10` before
    /// `lane2`).
    #[default]
    Lexicographic,
    /// Order by the numeric suffix. Keys without one come first, in string
    /// order.
    Numeric,
}

impl KeyOrder {
    /// Sort `keys` sharing `prefix`.
    ///
    /// # Examples
    /// ```
    /// use ilp_reader::KeyOrder;
    ///
    /// let mut keys = vec!["lane10".to_string(), "lane2".to_string()];
    /// KeyOrder::Numeric.sort(&mut keys, "lane");
    /// assert_eq!(keys, ["lane2", "lane10"]);
    /// KeyOrder::Lexicographic.sort(&mut keys, "lane");
    /// assert_eq!(keys, ["lane10", "lane2"]);
    /// ```
    pub fn sort(self, keys: &mut [String], prefix: &str) {
        match self {
            KeyOrder::Lexicographic => keys.sort(),
            KeyOrder::Numeric => keys.sort_by(|a, b| compare_numeric(a, b, prefix)),
        }
    }
}

fn compare_numeric(a: &str, b: &str, prefix: &str) -> Ordering {
    let index = |key: &str| {
        key.strip_prefix(prefix)
            .and_then(|suffix| suffix.parse::<u64>().ok())
    };
    index(a).cmp(&index(b)).then_with(|| a.cmp(b))
}

/// Decoding options.
///
/// # Examples
/// ```
/// use ilp_reader::{KeyOrder, ReadOptions};
///
/// let options: ReadOptions = serde_json::from_str(r#"{"key_order": "numeric"}"#).unwrap();
/// assert_eq!(options.key_order, KeyOrder::Numeric);
/// assert!(options.check_axes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Order of lanes, label sets and label blocks.
    pub key_order: KeyOrder,
    /// Require one axis tag per shape dimension in input metadata.
    pub check_axes: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            key_order: KeyOrder::default(),
            check_axes: true,
        }
    }
}
