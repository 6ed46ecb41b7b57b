//! # Design
//!
//! - Structured, constant-message errors for conditions the engine cannot fold into a result.
//! - Operation and path context travel as fields, never interpolated into messages.
//! - Per-request problems (missing source, copy failure) are `IngestIssue`s, not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::EntryKind;

/// Result alias for the ingestion engine.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced by the versioning and ingestion engine.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// A create, copy, or metadata call returned an OS error.
    #[error("filesystem call failed")]
    Io {
        /// Step name, e.g. `reserve.create_dir`.
        operation: &'static str,
        /// Path the call was made on.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Recursive traversal of a template or source tree failed.
    #[error("directory walk failed")]
    Walkdir {
        /// Step name, e.g. `copy_tree.walk`.
        operation: &'static str,
        /// Root of the walk.
        path: PathBuf,
        /// Traversal error.
        source: walkdir::Error,
    },
    /// A built-in pattern failed to compile.
    #[error("frame pattern did not compile")]
    RegexCompile {
        /// Pattern that failed to compile.
        pattern: &'static str,
        /// Compiler error.
        source: regex::Error,
    },
    /// A request field cannot be turned into a path segment or setting.
    #[error("request field rejected")]
    InvalidInput {
        /// Request field, e.g. `shot`.
        field: &'static str,
        /// Short machine-readable reason.
        reason: &'static str,
        /// Rejected value, if any.
        value: Option<String>,
    },
    /// A path required by the operation does not exist.
    #[error("path does not exist")]
    PathNotFound {
        /// Operation that required the path.
        operation: &'static str,
        /// Missing path.
        path: PathBuf,
    },
    /// A path exists but is not the expected kind.
    #[error("path has the wrong type")]
    PathTypeMismatch {
        /// Operation that inspected the path.
        operation: &'static str,
        /// Offending path.
        path: PathBuf,
        /// Kind the operation expected.
        expected: EntryKind,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn regex(pattern: &'static str, source: regex::Error) -> Self {
        Self::RegexCompile { pattern, source }
    }

    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self::InvalidInput {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }

    /// Render the error with its context and source chain on one line.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut rendered = match self {
            Self::Io {
                operation, path, ..
            }
            | Self::Walkdir {
                operation, path, ..
            }
            | Self::PathNotFound { operation, path } => {
                format!("{self} ({operation}: {})", path.display())
            }
            Self::PathTypeMismatch {
                operation,
                path,
                expected,
            } => format!(
                "{self} ({operation}: {} is not a {})",
                path.display(),
                expected.as_str()
            ),
            Self::RegexCompile { pattern, .. } => format!("{self} ({pattern})"),
            Self::InvalidInput {
                field,
                reason,
                value,
            } => match value {
                Some(value) => format!("{self} ({field}: {reason}, value {value:?})"),
                None => format!("{self} ({field}: {reason})"),
            },
        };
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use walkdir::WalkDir;

    type TestResult<T> = anyhow::Result<T>;

    #[test]
    fn constructors_keep_their_sources() -> TestResult<()> {
        let io_err = FsOpsError::io("reserve.create_dir", "/p/v0001", io::Error::other("disk"));
        assert!(matches!(io_err, FsOpsError::Io { .. }));
        assert!(io_err.source().is_some());

        let temp = vfxpipe_test_support::temp_dir("vfxpipe-fsops-")?;
        let missing = temp.path().join("missing");
        let walkdir_error = WalkDir::new(&missing)
            .into_iter()
            .next()
            .and_then(Result::err)
            .ok_or_else(|| anyhow::anyhow!("expected walkdir error"))?;
        let walk_err = FsOpsError::walkdir("copy_tree.walk", &missing, walkdir_error);
        assert!(matches!(walk_err, FsOpsError::Walkdir { .. }));
        assert!(walk_err.source().is_some());

        let Err(regex_error) = regex::Regex::new("(") else {
            anyhow::bail!("expected regex error");
        };
        let regex_err = FsOpsError::regex("(", regex_error);
        assert!(matches!(regex_err, FsOpsError::RegexCompile { .. }));
        Ok(())
    }

    #[test]
    fn describe_includes_context_and_cause() {
        let err = FsOpsError::io(
            "transfer.copy_file",
            "/p/plate.1001.exr",
            io::Error::other("no space left"),
        );
        let rendered = err.describe();
        assert!(
            rendered.starts_with("filesystem call failed (transfer.copy_file: /p/plate.1001.exr)")
        );
        assert!(rendered.ends_with("no space left"));

        let invalid = FsOpsError::invalid("shot", "empty_segment", "");
        assert_eq!(
            invalid.describe(),
            "request field rejected (shot: empty_segment, value \"\")"
        );
    }
}
