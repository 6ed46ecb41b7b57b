use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use serde::Serialize;

use super::EntryKind;

/// Which input a path-related issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRole {
    /// The delivered source file or directory.
    Source,
    /// The department template tree.
    Template,
}

impl PathRole {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source path",
            Self::Template => "template tree",
        }
    }
}

/// A non-fatal problem recorded in a workspace or ingestion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestIssue {
    /// A request field was unusable as a path segment or file name part.
    InvalidRequest {
        /// Offending field.
        field: &'static str,
        /// Static reason.
        reason: &'static str,
        /// Offending value.
        value: String,
    },
    /// A referenced path does not exist.
    PathNotFound {
        /// Which input was missing.
        role: PathRole,
        /// Missing path.
        path: PathBuf,
    },
    /// A referenced path exists but is the wrong kind.
    PathTypeMismatch {
        /// Which input was wrong.
        role: PathRole,
        /// Offending path.
        path: PathBuf,
        /// Kind that was required.
        expected: EntryKind,
    },
    /// Every version reservation attempt collided with another writer.
    VersionCollision {
        /// Directory holding the version folders.
        base: PathBuf,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// A sequence source held no members with the requested extension.
    NoMatchingFiles {
        /// Source directory.
        path: PathBuf,
        /// Extension searched for, without a leading dot.
        extension: String,
    },
    /// An individual copy failed.
    CopyFailed {
        /// File or tree being copied.
        source: PathBuf,
        /// Intended destination.
        destination: PathBuf,
        /// Underlying failure.
        detail: String,
    },
}

impl Display for IngestIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest {
                field,
                reason,
                value,
            } => write!(f, "invalid request field {field} ({reason}): {value:?}"),
            Self::PathNotFound { role, path } => {
                write!(f, "{} does not exist: {}", role.as_str(), path.display())
            }
            Self::PathTypeMismatch {
                role,
                path,
                expected,
            } => write!(
                f,
                "{} is not a {}: {}",
                role.as_str(),
                expected.as_str(),
                path.display()
            ),
            Self::VersionCollision { base, attempts } => write!(
                f,
                "could not reserve a version under {} after {attempts} attempts",
                base.display()
            ),
            Self::NoMatchingFiles { path, extension } => write!(
                f,
                "no .{extension} files found in {}",
                path.display()
            ),
            Self::CopyFailed {
                source,
                destination,
                detail,
            } => write!(
                f,
                "failed to copy {} to {}: {detail}",
                source.display(),
                destination.display()
            ),
        }
    }
}

/// Join issues one per line, or `None` when there are none.
#[must_use]
pub fn render_issues(issues: &[IngestIssue]) -> Option<String> {
    if issues.is_empty() {
        return None;
    }
    Some(
        issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
