//! File and tree copies used by provisioning and ingestion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use filetime::FileTime;
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// One planned copy with its destination index already fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Source file.
    pub source: PathBuf,
    /// Destination file.
    pub destination: PathBuf,
}

/// A job that did not complete.
#[derive(Debug)]
pub struct CopyFailure {
    /// Position of the job in the plan.
    pub position: usize,
    /// Underlying failure.
    pub error: io::Error,
}

/// Copy a file and carry over its access and modification times.
///
/// Permissions follow [`fs::copy`].
///
/// # Errors
///
/// Returns the IO error from the copy or from restoring timestamps.
pub fn copy_file_preserving(source: &Path, destination: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, destination)?;
    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;
    Ok(bytes)
}

/// Recursively copy `source` into `destination`, creating directories as needed.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or any entry cannot be written.
pub fn copy_tree(source: &Path, destination: &Path) -> FsOpsResult<usize> {
    fs::create_dir_all(destination)
        .map_err(|err| FsOpsError::io("copy_tree.create_dir", destination, err))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|err| FsOpsError::walkdir("copy_tree.walk", source, err))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| FsOpsError::InvalidInput {
                field: "template_path",
                reason: "strip_prefix",
                value: Some(entry.path().to_string_lossy().into_owned()),
            })?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|err| FsOpsError::io("copy_tree.create_dir", &target, err))?;
        } else {
            copy_file_preserving(entry.path(), &target)
                .map_err(|err| FsOpsError::io("copy_tree.copy_entry", &target, err))?;
            copied += 1;
        }
    }
    debug!(
        source = %source.display(),
        destination = %destination.display(),
        files = copied,
        "template tree copied"
    );
    Ok(copied)
}

/// Run `jobs` on up to `workers` threads and report failures in plan order.
///
/// Jobs are claimed from a shared cursor, so completion order is arbitrary but
/// each job keeps the destination it was planned with.
#[must_use]
pub fn copy_batch(jobs: &[CopyJob], workers: usize) -> Vec<CopyFailure> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, jobs.len());
    let cursor = AtomicUsize::new(0);
    let outcomes: Mutex<Vec<Option<io::Result<u64>>>> =
        Mutex::new((0..jobs.len()).map(|_| None).collect());

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    loop {
                        let position = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(job) = jobs.get(position) else {
                            break;
                        };
                        let outcome = copy_file_preserving(&job.source, &job.destination);
                        if let Ok(mut slots) = outcomes.lock() {
                            slots[position] = Some(outcome);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("copy worker panicked; its unfinished copies are reported as failed");
            }
        }
    });

    let slots = outcomes
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    slots
        .into_iter()
        .enumerate()
        .filter_map(|(position, outcome)| match outcome {
            Some(Ok(_)) => None,
            Some(Err(error)) => Some(CopyFailure { position, error }),
            None => Some(CopyFailure {
                position,
                error: io::Error::other("copy did not complete"),
            }),
        })
        .collect()
}
