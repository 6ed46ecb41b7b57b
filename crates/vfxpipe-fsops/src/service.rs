//! Workspace provisioning, directory listing, and ingestion.
//!
//! # Design
//! - Every request is validated and every source inspected before a version is
//!   reserved, so rejected requests leave nothing behind on disk.
//! - Per-request problems become ordered `IngestIssue`s on the result; only
//!   unexpected IO failures surface as `FsOpsError`.
//! - Sequence copies are planned up front so destination indices depend on the
//!   sorted member order, never on completion order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use vfxpipe_telemetry::Metrics;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{
    DirectoryListing, DirectoryListingRequest, EngineSettings, EntryKind, IngestIssue, IngestMode,
    IngestionRequest, IngestionResult, PathRole, WorkspaceRequest, WorkspaceResult,
};
use crate::paths::{build_path, normalise_separators, validate_segment};
use crate::sequence::SequenceDetector;
use crate::transfer::{CopyJob, copy_batch, copy_file_preserving, copy_tree};
use crate::version::{Reservation, VersionLabel, VersionResolver, VersionedPath};

/// Output frame numbers start after this offset.
const FRAME_INDEX_OFFSET: usize = 1000;
const TEMPLATES_DIR: &str = "Templates";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    ProvisionWorkspace,
    Ingest,
    ListDirectory,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ProvisionWorkspace => "provision_workspace",
            Self::Ingest => "ingest",
            Self::ListDirectory => "list_directory",
        }
    }
}

/// Versioning and ingestion engine bound to a template root and a project root.
#[derive(Clone)]
pub struct FsOpsService {
    settings: EngineSettings,
    resolver: VersionResolver,
    detector: SequenceDetector,
    metrics: Metrics,
}

impl FsOpsService {
    /// Construct the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if a tunable is zero or a built-in pattern fails to compile.
    pub fn new(settings: EngineSettings, metrics: Metrics) -> FsOpsResult<Self> {
        if settings.copy_workers == 0 {
            return Err(FsOpsError::InvalidInput {
                field: "copy_workers",
                reason: "must_be_positive",
                value: Some("0".to_string()),
            });
        }
        Ok(Self {
            resolver: VersionResolver::new(settings.version_retry_limit)?,
            detector: SequenceDetector::new()?,
            settings,
            metrics,
        })
    }

    /// Provision `{project_root}/{project}/{sequence}/{shot}/{department}/{version}/{department}`
    /// from `{template_root}/Templates/{department}`.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected IO failures while reserving the version.
    pub fn provision_workspace(&self, request: &WorkspaceRequest) -> FsOpsResult<WorkspaceResult> {
        let result = self.run_provision(request);
        self.record(
            Operation::ProvisionWorkspace,
            result.as_ref().map(|outcome| outcome.success),
        );
        result
    }

    /// Copy a delivered file or sequence into a freshly reserved version directory.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected IO failures such as an unreadable
    /// source directory or a failure to create the version directory.
    pub fn ingest(&self, request: &IngestionRequest) -> FsOpsResult<IngestionResult> {
        let result = self.run_ingest(request);
        self.record(
            Operation::Ingest,
            result.as_ref().map(|outcome| outcome.success),
        );
        result
    }

    /// List `{search_path}/{folders_to_search}` with sequences compacted.
    ///
    /// Names are sorted before detection so output does not depend on the
    /// platform's directory order. An empty directory yields an empty listing.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::PathNotFound`] or [`FsOpsError::PathTypeMismatch`]
    /// for a bad target, and [`FsOpsError::Io`] when it cannot be read.
    pub fn list_directory(
        &self,
        request: &DirectoryListingRequest,
    ) -> FsOpsResult<DirectoryListing> {
        let result = self.run_listing(request);
        self.record(Operation::ListDirectory, result.as_ref().map(|_| true));
        result
    }

    fn run_provision(&self, request: &WorkspaceRequest) -> FsOpsResult<WorkspaceResult> {
        let (base, template) = match self.workspace_paths(request) {
            Ok(paths) => paths,
            Err(err) => {
                return Ok(WorkspaceResult {
                    success: false,
                    destination: None,
                    template_used: PathBuf::new(),
                    version: None,
                    errors: vec![into_request_issue(err)?],
                });
            }
        };
        let rejected = |issue: IngestIssue| WorkspaceResult {
            success: false,
            destination: None,
            template_used: template.clone(),
            version: None,
            errors: vec![issue],
        };

        if let Some(issue) = check_kind(&template, EntryKind::Directory, PathRole::Template)? {
            warn!(
                department = %request.department,
                template = %template.display(),
                "template tree unavailable"
            );
            return Ok(rejected(issue));
        }

        let version = match self.reserve(&base)? {
            Ok(version) => version,
            Err(issue) => return Ok(rejected(issue)),
        };
        let destination = version.path.join(&request.department);

        let mut errors = Vec::new();
        match copy_tree(&template, &destination) {
            Ok(files) => {
                self.metrics.add_files_copied(files as u64);
                info!(
                    user = %request.user,
                    project = %request.project,
                    version = %version.label,
                    destination = %destination.display(),
                    files,
                    "workspace provisioned"
                );
            }
            Err(err) => {
                warn!(
                    destination = %destination.display(),
                    error = %err.describe(),
                    "template copy failed"
                );
                errors.push(IngestIssue::CopyFailed {
                    source: template.clone(),
                    destination: destination.clone(),
                    detail: err.describe(),
                });
            }
        }

        Ok(WorkspaceResult {
            success: errors.is_empty(),
            destination: Some(destination),
            template_used: template,
            version: Some(version.label),
            errors,
        })
    }

    fn workspace_paths(&self, request: &WorkspaceRequest) -> FsOpsResult<(PathBuf, PathBuf)> {
        require_value("user", request.user.as_str())?;
        let base = build_path(
            &self.settings.project_root,
            &[
                ("project", request.project.as_str()),
                ("sequence", request.sequence.as_str()),
                ("shot", request.shot.as_str()),
                ("department", request.department.as_str()),
            ],
        )?;
        let template = build_path(
            &self.settings.template_root,
            &[
                ("template_dir", TEMPLATES_DIR),
                ("department", request.department.as_str()),
            ],
        )?;
        Ok((base, template))
    }

    fn run_ingest(&self, request: &IngestionRequest) -> FsOpsResult<IngestionResult> {
        let source = request.src_path.clone();
        let reject = |issue: IngestIssue| -> FsOpsResult<IngestionResult> {
            Ok(IngestionResult::failed(source.clone(), vec![issue]))
        };

        let (base, extension) = match self.ingest_paths(request) {
            Ok(paths) => paths,
            Err(err) => return reject(into_request_issue(err)?),
        };
        if let Some(issue) = check_kind(
            &request.src_path,
            request.mode.expected_source(),
            PathRole::Source,
        )? {
            warn!(
                source = %request.src_path.display(),
                mode = request.mode.as_str(),
                "ingest source rejected"
            );
            return reject(issue);
        }

        let members = match request.mode {
            IngestMode::Single => Vec::new(),
            IngestMode::Sequence => {
                let members = self.sequence_members(&request.src_path, &extension)?;
                if members.is_empty() {
                    return reject(IngestIssue::NoMatchingFiles {
                        path: request.src_path.clone(),
                        extension,
                    });
                }
                members
            }
        };

        let version = match self.reserve(&base)? {
            Ok(version) => version,
            Err(issue) => return reject(issue),
        };
        let label = request.versioning.then_some(version.label);

        let result = match request.mode {
            IngestMode::Single => {
                let name = output_name(&request.naming_scheme, label, None, &extension);
                self.ingest_single(&request.src_path, &version, &name)
            }
            IngestMode::Sequence => {
                let jobs: Vec<CopyJob> = members
                    .into_iter()
                    .enumerate()
                    .map(|(position, member)| {
                        let index = FRAME_INDEX_OFFSET + position + 1;
                        CopyJob {
                            destination: version.path.join(output_name(
                                &request.naming_scheme,
                                label,
                                Some(index),
                                &extension,
                            )),
                            source: member,
                        }
                    })
                    .collect();
                self.ingest_sequence(&request.src_path, &version, &jobs)
            }
        };

        info!(
            user = %request.user,
            project = %request.project,
            mode = request.mode.as_str(),
            version = %version.label,
            files = result.copied.len(),
            failed = result.errors.len(),
            "ingest finished"
        );
        Ok(result)
    }

    fn ingest_paths(&self, request: &IngestionRequest) -> FsOpsResult<(PathBuf, String)> {
        require_value("user", request.user.as_str())?;
        if request.src_path.as_os_str().is_empty() {
            return Err(FsOpsError::invalid("src_path", "empty_value", ""));
        }
        let extension = request.extension.trim().trim_start_matches('.');
        validate_segment("extension", extension)?;
        let base = build_path(
            &self.settings.project_root,
            &[
                ("project", request.project.as_str()),
                ("sequence", request.sequence.as_str()),
                ("shot", request.shot.as_str()),
                ("department", request.department.as_str()),
                ("type", request.asset_type.as_str()),
                ("naming_scheme", request.naming_scheme.as_str()),
            ],
        )?;
        Ok((base, extension.to_string()))
    }

    fn ingest_single(
        &self,
        source: &Path,
        version: &VersionedPath,
        file_name: &str,
    ) -> IngestionResult {
        let destination = version.path.join(file_name);
        match copy_file_preserving(source, &destination) {
            Ok(_) => {
                self.metrics.add_files_copied(1);
                IngestionResult {
                    success: true,
                    destination_path: Some(destination.clone()),
                    source_path: source.to_path_buf(),
                    version: Some(version.label),
                    copied: vec![destination],
                    errors: Vec::new(),
                }
            }
            Err(err) => {
                warn!(
                    source = %source.display(),
                    destination = %destination.display(),
                    error = %err,
                    "file copy failed"
                );
                IngestionResult {
                    success: false,
                    destination_path: None,
                    source_path: source.to_path_buf(),
                    version: Some(version.label),
                    copied: Vec::new(),
                    errors: vec![IngestIssue::CopyFailed {
                        source: source.to_path_buf(),
                        destination,
                        detail: err.to_string(),
                    }],
                }
            }
        }
    }

    fn ingest_sequence(
        &self,
        source: &Path,
        version: &VersionedPath,
        jobs: &[CopyJob],
    ) -> IngestionResult {
        let failures = copy_batch(jobs, self.settings.copy_workers);

        let mut failed = vec![false; jobs.len()];
        let mut errors = Vec::with_capacity(failures.len());
        for failure in failures {
            let job = &jobs[failure.position];
            failed[failure.position] = true;
            warn!(
                source = %job.source.display(),
                destination = %job.destination.display(),
                error = %failure.error,
                "sequence member copy failed"
            );
            errors.push(IngestIssue::CopyFailed {
                source: job.source.clone(),
                destination: job.destination.clone(),
                detail: failure.error.to_string(),
            });
        }
        let copied: Vec<PathBuf> = jobs
            .iter()
            .zip(&failed)
            .filter(|(_, failed)| !**failed)
            .map(|(job, _)| job.destination.clone())
            .collect();
        self.metrics.add_files_copied(copied.len() as u64);

        IngestionResult {
            success: errors.is_empty(),
            destination_path: Some(version.path.clone()),
            source_path: source.to_path_buf(),
            version: Some(version.label),
            copied,
            errors,
        }
    }

    /// Members of `dir` ending in `.{extension}`, ordered by prefix and frame number.
    fn sequence_members(&self, dir: &Path, extension: &str) -> FsOpsResult<Vec<PathBuf>> {
        let suffix = format!(".{extension}");
        let entries =
            fs::read_dir(dir).map_err(|err| FsOpsError::io("ingest.list_source", dir, err))?;
        // Lossy names only order and filter; copies read from the real path.
        let mut members: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| FsOpsError::io("ingest.list_source", dir, err))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(&suffix) {
                members.push((name, path));
            }
        }
        members.sort_by(|(left, _), (right, _)| self.detector.compare_members(left, right));
        Ok(members.into_iter().map(|(_, path)| path).collect())
    }

    fn run_listing(&self, request: &DirectoryListingRequest) -> FsOpsResult<DirectoryListing> {
        if request.search_path.trim().is_empty() {
            return Err(FsOpsError::invalid(
                "search_path",
                "empty_value",
                &request.search_path,
            ));
        }
        let target = normalise_separators(&request.search_path)
            .join(normalise_separators(&request.folders_to_search));
        match inspect(&target)? {
            None => {
                return Err(FsOpsError::PathNotFound {
                    operation: Operation::ListDirectory.as_str(),
                    path: target,
                });
            }
            Some(EntryKind::File) => {
                return Err(FsOpsError::PathTypeMismatch {
                    operation: Operation::ListDirectory.as_str(),
                    path: target,
                    expected: EntryKind::Directory,
                });
            }
            Some(EntryKind::Directory) => {}
        }

        let mut names = Vec::new();
        for entry in
            fs::read_dir(&target).map_err(|err| FsOpsError::io("listing.read_dir", &target, err))?
        {
            let entry = entry.map_err(|err| FsOpsError::io("listing.read_entry", &target, err))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let entries = self
            .detector
            .detect(&names, request.extension.as_deref());
        Ok(DirectoryListing {
            search_path: target,
            entries,
        })
    }

    /// Reserve the next version under `base`, folding exhaustion into an issue.
    fn reserve(&self, base: &Path) -> FsOpsResult<Result<VersionedPath, IngestIssue>> {
        match self.resolver.reserve_next(base)? {
            Reservation::Reserved {
                version,
                collisions,
            } => {
                for _ in 0..collisions {
                    self.metrics.inc_version_collision();
                }
                Ok(Ok(version))
            }
            Reservation::Exhausted {
                attempts,
                last_label,
            } => {
                for _ in 0..attempts {
                    self.metrics.inc_version_collision();
                }
                warn!(
                    base = %base.display(),
                    attempts,
                    last = %last_label,
                    "version reservation exhausted"
                );
                Ok(Err(IngestIssue::VersionCollision {
                    base: base.to_path_buf(),
                    attempts,
                }))
            }
        }
    }

    fn record(&self, operation: Operation, outcome: Result<bool, &FsOpsError>) {
        let label = match outcome {
            Ok(true) => "success",
            Ok(false) => "failed",
            Err(err) => {
                error!(
                    operation = operation.as_str(),
                    error = %err.describe(),
                    "fsops operation aborted"
                );
                "error"
            }
        };
        self.metrics.inc_fsops_operation(operation.as_str(), label);
    }
}

/// `{scheme}[_{version}][.{index}].{extension}`
fn output_name(
    scheme: &str,
    version: Option<VersionLabel>,
    index: Option<usize>,
    extension: &str,
) -> String {
    let mut name = scheme.to_string();
    if let Some(version) = version {
        name.push('_');
        name.push_str(&version.to_string());
    }
    if let Some(index) = index {
        name.push('.');
        name.push_str(&index.to_string());
    }
    name.push('.');
    name.push_str(extension);
    name
}

fn require_value(field: &'static str, value: &str) -> FsOpsResult<()> {
    if value.trim().is_empty() {
        return Err(FsOpsError::invalid(field, "empty_value", value));
    }
    Ok(())
}

fn into_request_issue(err: FsOpsError) -> FsOpsResult<IngestIssue> {
    match err {
        FsOpsError::InvalidInput {
            field,
            reason,
            value,
        } => Ok(IngestIssue::InvalidRequest {
            field,
            reason,
            value: value.unwrap_or_default(),
        }),
        other => Err(other),
    }
}

fn inspect(path: &Path) -> FsOpsResult<Option<EntryKind>> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
        Ok(_) => Ok(Some(EntryKind::File)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(FsOpsError::io("inspect.metadata", path, err)),
    }
}

/// `None` when `path` exists with the expected kind, otherwise the matching issue.
fn check_kind(
    path: &Path,
    expected: EntryKind,
    role: PathRole,
) -> FsOpsResult<Option<IngestIssue>> {
    Ok(match inspect(path)? {
        None => Some(IngestIssue::PathNotFound {
            role,
            path: path.to_path_buf(),
        }),
        Some(kind) if kind != expected => Some(IngestIssue::PathTypeMismatch {
            role,
            path: path.to_path_buf(),
            expected,
        }),
        Some(_) => None,
    })
}
