//! Scratch clone directories, one per job.
//!
//! The path is derived from the folder name alone, so a crash mid-job leaves
//! a directory that the next [`Workspace::acquire`] for the same folder
//! removes before reuse.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gitbridge_core::FolderName;

use crate::error::{io_err, SyncError};

/// `<root>/sync_<folder>`. Pure, no I/O.
pub fn workspace_path(root: &Path, folder: &FolderName) -> PathBuf {
    root.join(format!("sync_{}", folder.as_str()))
}

/// Exclusive ownership of a job's scratch directory.
///
/// The directory is removed by [`Workspace::release`] or, failing that, when
/// the guard is dropped.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Reserve the canonical path for `folder`, removing any leftover tree.
    ///
    /// The returned path does not exist; the caller populates it by cloning.
    pub fn acquire(root: &Path, folder: &FolderName) -> Result<Self, SyncError> {
        std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
        let path = workspace_path(root, folder);
        if path.symlink_metadata().is_ok() {
            tracing::info!("removing stale workspace {}", path.display());
            remove_tree(&path).map_err(|e| io_err(&path, e))?;
        }
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the workspace. Failures are logged, never returned.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = remove_tree(&self.path) {
            tracing::error!(
                "failed to remove workspace {}: {err}",
                self.path.display()
            );
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Remove `path` whether it is a directory, file, or symlink. Missing is fine.
pub(crate) fn remove_tree(path: &Path) -> std::io::Result<()> {
    let meta = match path.symlink_metadata() {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
