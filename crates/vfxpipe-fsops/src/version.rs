//! Version resolution and atomic version directory reservation.
//!
//! # Design
//! - The filesystem is the system of record; the next version is `max + 1` over
//!   sibling directories whose names match the version pattern.
//! - Resolution only computes a path. Reservation creates the version directory
//!   with an exclusive `create_dir`; an `AlreadyExists` failure is a collision and
//!   triggers a fresh resolution, up to a bounded number of attempts.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FsOpsError, FsOpsResult};

/// Exactly four digits, or a widened label past `v9999` without leading zeros.
const VERSION_PATTERN: &str = r"^v(\d{4}|[1-9]\d{4,})$";

/// Numeric version rendered as `v` plus at least four zero-padded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct VersionLabel(u64);

impl VersionLabel {
    /// The first version of any base path.
    pub const FIRST: Self = Self(1);

    /// Wrap a version number.
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// The version after this one, saturating at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Display for VersionLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{:04}", self.0)
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.to_string()
    }
}

/// A version directory path and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPath {
    /// `{base}/{label}`.
    pub path: PathBuf,
    /// Version label.
    pub label: VersionLabel,
}

/// Outcome of [`VersionResolver::reserve_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// The version directory now exists and belongs to the caller.
    Reserved {
        /// Reserved directory.
        version: VersionedPath,
        /// Collisions observed before the reservation succeeded.
        collisions: u32,
    },
    /// Every attempt collided.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Label tried on the final attempt.
        last_label: VersionLabel,
    },
}

/// Computes and reserves version directories under a base path.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    pattern: Regex,
    retry_limit: u32,
}

impl VersionResolver {
    /// Build a resolver that makes at most `retry_limit` reservation attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if the version pattern fails to compile or the limit is zero.
    pub fn new(retry_limit: u32) -> FsOpsResult<Self> {
        if retry_limit == 0 {
            return Err(FsOpsError::InvalidInput {
                field: "version_retry_limit",
                reason: "must_be_positive",
                value: Some(retry_limit.to_string()),
            });
        }
        let pattern =
            Regex::new(VERSION_PATTERN).map_err(|err| FsOpsError::regex(VERSION_PATTERN, err))?;
        Ok(Self {
            pattern,
            retry_limit,
        })
    }

    /// Parse a directory name as a version label, if it matches the pattern.
    #[must_use]
    pub fn parse_label(&self, name: &str) -> Option<VersionLabel> {
        let digits = self.pattern.captures(name)?.get(1)?.as_str();
        digits.parse::<u64>().ok().map(VersionLabel)
    }

    /// Compute the next version under `base` without creating anything.
    ///
    /// A missing `base` yields `v0001`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` exists but cannot be listed.
    pub fn resolve_next(&self, base: &Path) -> FsOpsResult<VersionedPath> {
        let label = match fs::read_dir(base) {
            Ok(entries) => {
                let mut highest = None;
                for entry in entries {
                    let entry =
                        entry.map_err(|err| FsOpsError::io("version.scan_entry", base, err))?;
                    if !entry.path().is_dir() {
                        continue;
                    }
                    let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                        continue;
                    };
                    if let Some(found) = self.parse_label(&name) {
                        highest = highest.max(Some(found));
                    }
                }
                highest.map_or(VersionLabel::FIRST, VersionLabel::next)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => VersionLabel::FIRST,
            Err(err) => return Err(FsOpsError::io("version.scan", base, err)),
        };
        Ok(VersionedPath {
            path: base.join(label.to_string()),
            label,
        })
    }

    /// Resolve the next version and create its directory exclusively.
    ///
    /// Parent directories are created as needed. If another writer creates the
    /// same version first, resolution starts over.
    ///
    /// # Errors
    ///
    /// Returns an error for IO failures other than a collision.
    pub fn reserve_next(&self, base: &Path) -> FsOpsResult<Reservation> {
        fs::create_dir_all(base).map_err(|err| FsOpsError::io("version.create_base", base, err))?;

        let mut collisions = 0;
        let mut last_label = VersionLabel::FIRST;
        for attempt in 1..=self.retry_limit {
            let candidate = self.resolve_next(base)?;
            last_label = candidate.label;
            match fs::create_dir(&candidate.path) {
                Ok(()) => {
                    debug!(
                        path = %candidate.path.display(),
                        attempt,
                        "reserved version directory"
                    );
                    return Ok(Reservation::Reserved {
                        version: candidate,
                        collisions,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    collisions += 1;
                    warn!(
                        path = %candidate.path.display(),
                        attempt,
                        "version directory already exists; resolving again"
                    );
                }
                Err(err) => {
                    return Err(FsOpsError::io("version.reserve", &candidate.path, err));
                }
            }
        }
        Ok(Reservation::Exhausted {
            attempts: self.retry_limit,
            last_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    type TestResult<T> = anyhow::Result<T>;

    fn temp_dir() -> TestResult<tempfile::TempDir> {
        vfxpipe_test_support::temp_dir("vfxpipe-version-")
    }

    fn reserved(reservation: Reservation) -> TestResult<VersionedPath> {
        match reservation {
            Reservation::Reserved { version, .. } => Ok(version),
            Reservation::Exhausted { .. } => anyhow::bail!("expected a reservation"),
        }
    }

    #[test]
    fn labels_pad_to_four_digits_and_widen() {
        assert_eq!(VersionLabel::new(1).to_string(), "v0001");
        assert_eq!(VersionLabel::new(42).to_string(), "v0042");
        assert_eq!(VersionLabel::new(9999).to_string(), "v9999");
        assert_eq!(VersionLabel::new(12_345).to_string(), "v12345");
    }

    #[test]
    fn missing_base_resolves_to_first_version_without_creating_it() -> TestResult<()> {
        let temp = temp_dir()?;
        let base = temp.path().join("PROJ").join("plate");
        let resolver = VersionResolver::new(3)?;
        let next = resolver.resolve_next(&base)?;
        assert_eq!(next.label, VersionLabel::FIRST);
        assert_eq!(next.path, base.join("v0001"));
        assert!(!base.exists());
        Ok(())
    }

    #[test]
    fn serialized_reservations_are_monotonic() -> TestResult<()> {
        let temp = temp_dir()?;
        let base = temp.path().join("shot");
        let resolver = VersionResolver::new(3)?;
        let labels = (0..5)
            .map(|_| Ok(reserved(resolver.reserve_next(&base)?)?.label.to_string()))
            .collect::<TestResult<Vec<_>>>()?;
        assert_eq!(labels, vec!["v0001", "v0002", "v0003", "v0004", "v0005"]);
        assert!(base.join("v0005").is_dir());
        Ok(())
    }

    #[test]
    fn pattern_is_strict() -> TestResult<()> {
        let temp = temp_dir()?;
        let base = temp.path();
        for name in ["version1", "v01", "v00012x", "v00099", "V0050", "xv0040"] {
            fs::create_dir(base.join(name))?;
        }
        let resolver = VersionResolver::new(1)?;
        assert_eq!(resolver.resolve_next(base)?.label.to_string(), "v0001");

        fs::create_dir(base.join("v0007"))?;
        assert_eq!(resolver.resolve_next(base)?.label.to_string(), "v0008");
        Ok(())
    }

    #[test]
    fn files_named_like_versions_are_ignored() -> TestResult<()> {
        let temp = temp_dir()?;
        fs::create_dir(temp.path().join("v0003"))?;
        fs::write(temp.path().join("v0010"), b"not a directory")?;
        let resolver = VersionResolver::new(1)?;
        assert_eq!(
            resolver.resolve_next(temp.path())?.label,
            VersionLabel::new(4)
        );
        Ok(())
    }

    #[test]
    fn widened_labels_keep_counting() -> TestResult<()> {
        let temp = temp_dir()?;
        fs::create_dir(temp.path().join("v9999"))?;
        let resolver = VersionResolver::new(2)?;
        let first = reserved(resolver.reserve_next(temp.path())?)?;
        assert_eq!(first.label.to_string(), "v10000");
        let second = reserved(resolver.reserve_next(temp.path())?)?;
        assert_eq!(second.label.to_string(), "v10001");
        Ok(())
    }

    #[test]
    fn persistent_collision_exhausts_retries() -> TestResult<()> {
        let temp = temp_dir()?;
        fs::create_dir(temp.path().join("v0001"))?;
        fs::write(temp.path().join("v0002"), b"blocks the next version")?;
        let resolver = VersionResolver::new(3)?;
        let outcome = resolver.reserve_next(temp.path())?;
        assert_eq!(
            outcome,
            Reservation::Exhausted {
                attempts: 3,
                last_label: VersionLabel::new(2),
            }
        );
        Ok(())
    }

    #[test]
    fn concurrent_reservations_never_share_a_version() -> TestResult<()> {
        let temp = temp_dir()?;
        let base = Arc::new(temp.path().join("race"));
        let resolver = Arc::new(VersionResolver::new(32)?);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let base = Arc::clone(&base);
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || resolver.reserve_next(&base))
            })
            .collect();

        let mut labels = HashSet::new();
        for handle in handles {
            let outcome = handle
                .join()
                .map_err(|_| anyhow::anyhow!("reservation thread panicked"))??;
            assert!(labels.insert(reserved(outcome)?.label));
        }
        assert_eq!(labels.len(), 8);
        assert_eq!(labels.iter().max(), Some(&VersionLabel::new(8)));
        Ok(())
    }

    #[test]
    fn zero_retry_limit_is_rejected() {
        assert!(matches!(
            VersionResolver::new(0),
            Err(FsOpsError::InvalidInput {
                field: "version_retry_limit",
                ..
            })
        ));
    }
}
