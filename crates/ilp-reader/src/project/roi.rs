//! Label block ROI strings.
//!
//! A block records the region it covers as `"[start:stop, start:stop, ...]"`,
//! one pair per axis. Only the start offsets are needed to place the block in
//! the full volume.

/// Parse the start offset of every axis.
///
/// Surrounding brackets are optional but must be balanced; whitespace around
/// numbers and separators is ignored. Returns `None` for anything else.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use ilp_reader::project::roi::parse_start_offsets;
///
/// assert_eq!(parse_start_offsets("[3:5, 10:20]"), Some(vec![3, 10]));
/// assert_eq!(parse_start_offsets("[3:5, x:20]"), None);
/// ```
pub fn parse_start_offsets(roi: &str) -> Option<Vec<u64>> {
    let roi = roi.trim();
    let body = match (roi.strip_prefix('['), roi.ends_with(']')) {
        (Some(rest), true) => rest.strip_suffix(']')?,
        (None, false) => roi,
        _ => return None,
    };
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    body.split(',').map(parse_start).collect()
}

fn parse_start(range: &str) -> Option<u64> {
    let (start, stop) = range.split_once(':')?;
    let start = start.trim().parse::<u64>().ok()?;
    stop.trim().parse::<u64>().ok()?;
    Some(start)
}
