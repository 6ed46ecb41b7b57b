//! Composition of hierarchical identifiers into filesystem paths.

use std::path::{Path, PathBuf};

use crate::error::{FsOpsError, FsOpsResult};

/// A named path segment; the name is reported when validation fails.
pub type Segment<'a> = (&'static str, &'a str);

/// Join `segments` under `root`, in order.
///
/// Segments must be non-empty, must not contain `/` or `\`, and must not be
/// `.` or `..`. Invalid input is rejected, never sanitised.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] naming the first offending segment.
pub fn build_path(root: &Path, segments: &[Segment<'_>]) -> FsOpsResult<PathBuf> {
    let mut path = root.to_path_buf();
    for (field, value) in segments {
        validate_segment(field, value)?;
        path.push(value);
    }
    Ok(path)
}

/// Check a single path segment.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] when the segment is unusable.
pub fn validate_segment(field: &'static str, value: &str) -> FsOpsResult<()> {
    if value.is_empty() {
        return Err(FsOpsError::invalid(field, "empty_segment", value));
    }
    if value.contains(['/', '\\']) {
        return Err(FsOpsError::invalid(field, "contains_separator", value));
    }
    if value == "." || value == ".." {
        return Err(FsOpsError::invalid(field, "relative_segment", value));
    }
    Ok(())
}

/// Treat backslashes as separators so Windows-style search paths resolve.
pub(crate) fn normalise_separators(raw: &str) -> PathBuf {
    PathBuf::from(raw.replace('\\', "/"))
}
