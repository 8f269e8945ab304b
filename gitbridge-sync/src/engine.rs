//! Per-directory sync job.
//!
//! ```text
//! Start ─clone─▶ Cloned ─reconcile─▶ Reconciled ─add -A─▶ Staged
//!   Staged ─status empty─▶ NoChanges
//!   Staged ─commit─▶ Committed ─push─▶ Pushed
//!   any step ─error─▶ Failed (JobError records the last state reached)
//! ```
//!
//! The workspace is released on every path out of [`SyncEngine::sync`].

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use gitbridge_core::{FolderName, Settings, SyncJob};

use crate::error::{GitError, SyncError};
use crate::git::GitRunner;
use crate::reconcile::{reconcile, ReconcileOptions};
use crate::workspace::Workspace;

/// Output fragments that mean a commit had nothing in it.
pub const NOTHING_TO_COMMIT_MARKERS: [&str; 2] =
    ["nothing to commit", "no changes added to commit"];

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Last state a job reached before finishing or failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Start,
    Cloned,
    Reconciled,
    Staged,
    Committed,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStage::Start => write!(f, "start"),
            JobStage::Cloned => write!(f, "cloned"),
            JobStage::Reconciled => write!(f, "reconciled"),
            JobStage::Staged => write!(f, "staged"),
            JobStage::Committed => write!(f, "committed"),
        }
    }
}

/// Terminal success states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The remote already matched the source; nothing was committed or pushed.
    NoChanges,
    /// A commit with `message` was pushed.
    Pushed { message: String },
}

/// Successful job summary.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub folder: FolderName,
    pub repository_url: String,
    pub outcome: SyncOutcome,
    pub duration: Duration,
}

/// A failed job. The cause is already redacted.
#[derive(Debug, Error)]
#[error("sync of '{folder}' failed after reaching state '{stage}': {source}")]
pub struct JobError {
    pub folder: FolderName,
    pub stage: JobStage,
    #[source]
    pub source: SyncError,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs sync jobs against one [`Settings`].
#[derive(Debug, Clone)]
pub struct SyncEngine {
    settings: Settings,
    git: GitRunner,
}

impl SyncEngine {
    pub fn new(settings: Settings) -> Self {
        let git = GitRunner::new(settings.github_token.clone());
        Self { settings, git }
    }

    pub fn with_runner(settings: Settings, git: GitRunner) -> Self {
        Self { settings, git }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mirror `job.source_dir` into the job's remote.
    pub fn sync(&self, job: &SyncJob) -> Result<JobReport, JobError> {
        let started = Instant::now();
        let mut stage = JobStage::Start;

        let result = Workspace::acquire(&self.settings.workspace_root, &job.folder).and_then(
            |workspace| {
                let result = self.drive(job, workspace.path(), &mut stage);
                workspace.release();
                result
            },
        );

        match result {
            Ok(outcome) => Ok(JobReport {
                folder: job.folder.clone(),
                repository_url: job.repository_url.clone(),
                outcome,
                duration: started.elapsed(),
            }),
            Err(source) => {
                tracing::error!(
                    "error syncing {} with {}: {source}",
                    job.folder,
                    job.repository_url
                );
                Err(JobError {
                    folder: job.folder.clone(),
                    stage,
                    source,
                })
            }
        }
    }

    fn drive(
        &self,
        job: &SyncJob,
        dir: &Path,
        stage: &mut JobStage,
    ) -> Result<SyncOutcome, SyncError> {
        let folder = job.folder.as_str();

        tracing::info!("cloning repository for {folder}...");
        let target = dir.to_string_lossy().into_owned();
        self.git.run(
            [
                "clone",
                "--depth=1",
                job.authenticated_url(),
                target.as_str(),
            ],
            None,
        )?;
        *stage = JobStage::Cloned;
        if !self.git.has_tracked_files(dir) {
            tracing::info!("remote for {folder} has no tracked files yet");
        }

        tracing::info!("cleaning repository to match {folder} contents...");
        let stats = reconcile(
            dir,
            &job.source_dir,
            &ReconcileOptions {
                descriptor_filename: &self.settings.descriptor_filename,
                gitignore_template: self.settings.gitignore_template.as_deref(),
            },
        )?;
        tracing::debug!(
            "{folder}: removed {} entries, copied {} entries",
            stats.removed,
            stats.copied
        );
        *stage = JobStage::Reconciled;

        self.git.run(["add", "-A"], Some(dir))?;
        *stage = JobStage::Staged;

        let status = self.git.run(["status", "--porcelain"], Some(dir))?;
        if status.stdout.trim().is_empty() {
            tracing::info!("no changes detected for {folder}, skipping commit and push");
            return Ok(SyncOutcome::NoChanges);
        }

        match self.commit_and_push(folder, dir, stage) {
            Ok(message) => {
                tracing::info!(
                    "successfully synced {folder} with repository: {}",
                    job.repository_url
                );
                Ok(SyncOutcome::Pushed { message })
            }
            Err(SyncError::Git(err)) if is_nothing_to_commit(&err) => {
                tracing::info!("no changes to commit for {folder}");
                Ok(SyncOutcome::NoChanges)
            }
            Err(err) => Err(err),
        }
    }

    fn commit_and_push(
        &self,
        folder: &str,
        dir: &Path,
        stage: &mut JobStage,
    ) -> Result<String, SyncError> {
        // Workspace-local identity; global git config is never touched.
        self.git.run(
            ["config", "user.name", self.settings.git_user_name.as_str()],
            Some(dir),
        )?;
        self.git.run(
            ["config", "user.email", self.settings.git_user_email.as_str()],
            Some(dir),
        )?;

        let message = self.settings.commit_message(folder);
        self.git.run(["commit", "-m", message.as_str()], Some(dir))?;
        *stage = JobStage::Committed;

        tracing::info!("pushing changes for {folder}...");
        self.git.run(["push", "origin", "HEAD"], Some(dir))?;
        Ok(message)
    }
}

/// Whether a commit/push failure only means there was nothing to commit.
pub fn is_nothing_to_commit(err: &GitError) -> bool {
    NOTHING_TO_COMMIT_MARKERS
        .iter()
        .any(|marker| err.output_contains(marker))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
