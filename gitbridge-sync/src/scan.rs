//! One pass over the watched root.
//!
//! Every immediate child directory is visited in name order. Directories
//! without a descriptor are skipped silently, a bad descriptor skips only
//! its own directory, and a failed job never stops the pass.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use gitbridge_core::{descriptor, Cancellation, DescriptorError, FolderName, SyncJob};

use crate::engine::{JobError, JobReport, JobStage, SyncEngine, SyncOutcome};
use crate::error::{io_err, SyncError};

/// What happened to a single directory.
#[derive(Debug)]
pub enum DirectoryOutcome {
    /// No descriptor; not a sync target.
    NoDescriptor,
    /// The descriptor could not be used this cycle.
    Invalid(DescriptorError),
    /// The job finished (with or without a push).
    Synced(JobReport),
    /// The job failed.
    Failed(JobError),
}

/// A failed or invalid directory, with its redacted error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderFailure {
    pub folder: FolderName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<JobStage>,
    pub error: String,
}

/// Summary of one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    /// Jobs that pushed a commit.
    pub pushed: Vec<FolderName>,
    /// Jobs that found the remote already up to date.
    pub unchanged: Vec<FolderName>,
    pub failed: Vec<FolderFailure>,
    /// Directories with an unusable descriptor.
    pub invalid: Vec<FolderFailure>,
    /// Directories without a descriptor.
    pub skipped: Vec<FolderName>,
    /// True when shutdown was requested before every directory was visited.
    pub interrupted: bool,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            pushed: Vec::new(),
            unchanged: Vec::new(),
            failed: Vec::new(),
            invalid: Vec::new(),
            skipped: Vec::new(),
            interrupted: false,
        }
    }

    fn record(&mut self, folder: FolderName, outcome: DirectoryOutcome) {
        match outcome {
            DirectoryOutcome::NoDescriptor => self.skipped.push(folder),
            DirectoryOutcome::Invalid(err) => self.invalid.push(FolderFailure {
                folder,
                stage: None,
                error: err.to_string(),
            }),
            DirectoryOutcome::Synced(report) => match report.outcome {
                SyncOutcome::Pushed { .. } => self.pushed.push(folder),
                SyncOutcome::NoChanges => self.unchanged.push(folder),
            },
            DirectoryOutcome::Failed(err) => self.failed.push(FolderFailure {
                folder,
                stage: Some(err.stage),
                error: err.source.to_string(),
            }),
        }
    }

    /// Number of directories that carried a usable descriptor.
    pub fn attempted(&self) -> usize {
        self.pushed.len() + self.unchanged.len() + self.failed.len()
    }
}

/// Immediate child directories of `root`, sorted by name.
pub fn list_source_dirs(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| io_err(root, e))? {
        let entry = entry.map_err(|e| io_err(root, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Read `dir`'s descriptor and, if usable, run its job.
pub fn sync_directory(engine: &SyncEngine, dir: &Path) -> DirectoryOutcome {
    let settings = engine.settings();
    let descriptor = match descriptor::read_at(dir, &settings.descriptor_filename) {
        Ok(Some(descriptor)) => descriptor,
        Ok(None) => return DirectoryOutcome::NoDescriptor,
        Err(err) => {
            match &err {
                DescriptorError::MissingRepository { .. } => tracing::warn!("{err}"),
                _ => tracing::error!("{err}"),
            }
            return DirectoryOutcome::Invalid(err);
        }
    };

    let folder = folder_name(dir);
    let job = SyncJob::new(
        dir.to_path_buf(),
        folder,
        descriptor,
        settings.github_token.as_ref(),
    );
    match engine.sync(&job) {
        Ok(report) => DirectoryOutcome::Synced(report),
        Err(err) => DirectoryOutcome::Failed(err),
    }
}

/// Visit every directory under the watched root once.
///
/// `cancellation` is checked before each directory, never during a job.
pub fn scan_cycle(engine: &SyncEngine, cancellation: &Cancellation) -> CycleReport {
    scan_cycle_with(engine, cancellation, |_, _| {})
}

/// Like [`scan_cycle`], calling `on_directory` after each directory finishes.
pub fn scan_cycle_with<F>(
    engine: &SyncEngine,
    cancellation: &Cancellation,
    mut on_directory: F,
) -> CycleReport
where
    F: FnMut(&FolderName, &DirectoryOutcome),
{
    let started = Instant::now();
    let mut report = CycleReport::new(Utc::now());
    let root = &engine.settings().compiles_dir;

    let dirs = match list_source_dirs(root) {
        Ok(dirs) => dirs,
        Err(err) => {
            tracing::error!("cannot list {}: {err}", root.display());
            report.duration_ms = started.elapsed().as_millis();
            return report;
        }
    };

    for dir in dirs {
        if cancellation.is_cancelled() {
            tracing::info!("shutdown requested, stopping scan before {}", dir.display());
            report.interrupted = true;
            break;
        }
        let folder = folder_name(&dir);
        let outcome = sync_directory(engine, &dir);
        on_directory(&folder, &outcome);
        report.record(folder, outcome);
    }

    report.duration_ms = started.elapsed().as_millis();
    report
}

/// The directory's own name. Paths such as `.` or `thesis/..` are resolved
/// first so the name never contains a separator.
fn folder_name(dir: &Path) -> FolderName {
    FolderName::from_path(dir)
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|resolved| FolderName::from_path(&resolved))
        })
        .unwrap_or_else(|| FolderName::from(dir.display().to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
