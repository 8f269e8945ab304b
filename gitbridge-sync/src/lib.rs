//! # gitbridge-sync
//!
//! Mirror local directories into remote git repositories.
//!
//! Call [`SyncEngine::sync`] to mirror one [`gitbridge_core::SyncJob`], or
//! [`scan::scan_cycle`] to run one full pass over the watched root.

pub mod engine;
pub mod error;
pub mod git;
pub mod reconcile;
pub mod scan;
pub mod workspace;

pub use engine::{JobError, JobReport, JobStage, SyncEngine, SyncOutcome};
pub use error::{GitError, SyncError};
pub use git::{GitOutput, GitRunner};
pub use scan::{scan_cycle, scan_cycle_with, sync_directory, CycleReport, DirectoryOutcome};
pub use workspace::Workspace;
