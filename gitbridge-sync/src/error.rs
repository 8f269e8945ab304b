//! Error types for gitbridge-sync.

use std::path::PathBuf;

use thiserror::Error;

/// A failed git invocation. Every string field is already redacted.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be started.
    #[error("failed to run `git {args}`: {message}")]
    Spawn { args: String, message: String },

    /// git ran and exited unsuccessfully.
    #[error("`git {args}` failed ({status}): {stderr}")]
    Failed {
        args: String,
        status: String,
        stdout: String,
        stderr: String,
    },
}

impl GitError {
    /// True if `needle` appears in the captured stdout or stderr.
    pub fn output_contains(&self, needle: &str) -> bool {
        match self {
            GitError::Spawn { message, .. } => message.contains(needle),
            GitError::Failed { stdout, stderr, .. } => {
                stdout.contains(needle) || stderr.contains(needle)
            }
        }
    }
}

/// All errors that can arise inside a sync job or scan cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A git subcommand failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
