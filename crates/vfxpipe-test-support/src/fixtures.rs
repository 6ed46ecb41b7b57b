//! Temporary directory fixtures for engine and HTTP tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Create an isolated temporary directory whose name starts with `prefix`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_dir(prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .context("failed to create temporary directory")
}

/// Write `contents` to `root/relative`, creating parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write one small file per frame named `{prefix}{frame:04}.{extension}` into `dir`.
///
/// Each file holds its own name so copies can be traced back to their source.
///
/// # Errors
///
/// Returns an error if any frame cannot be written.
pub fn write_frames(
    dir: &Path,
    prefix: &str,
    extension: &str,
    frames: &[u32],
) -> Result<Vec<PathBuf>> {
    frames
        .iter()
        .map(|frame| {
            let name = format!("{prefix}{frame:04}.{extension}");
            write_file(dir, &name, name.as_bytes())
        })
        .collect()
}

/// A temporary template root and project root pair.
pub struct PipelineTree {
    dir: TempDir,
}

impl PipelineTree {
    /// Create empty `templates/` and `projects/` roots inside a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the roots cannot be created.
    pub fn new() -> Result<Self> {
        let dir = temp_dir("vfxpipe-tree-")?;
        fs::create_dir_all(dir.path().join("templates"))?;
        fs::create_dir_all(dir.path().join("projects"))?;
        fs::create_dir_all(dir.path().join("incoming"))?;
        Ok(Self { dir })
    }

    /// Root holding `Templates/{department}` trees.
    #[must_use]
    pub fn template_root(&self) -> PathBuf {
        self.dir.path().join("templates")
    }

    /// Root under which projects are provisioned.
    #[must_use]
    pub fn project_root(&self) -> PathBuf {
        self.dir.path().join("projects")
    }

    /// Scratch area for delivered sources.
    #[must_use]
    pub fn incoming(&self) -> PathBuf {
        self.dir.path().join("incoming")
    }

    /// Populate `Templates/{department}` with the given relative files.
    ///
    /// # Errors
    ///
    /// Returns an error if any template file cannot be written.
    pub fn add_template(&self, department: &str, files: &[&str]) -> Result<PathBuf> {
        let root = self.template_root().join("Templates").join(department);
        fs::create_dir_all(&root)?;
        for relative in files {
            write_file(&root, relative, relative.as_bytes())?;
        }
        Ok(root)
    }
}
