//! Error types for gitbridge-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building [`crate::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The watched root does not exist or is not a directory.
    #[error("compiles directory {path} does not exist; check COMPILES_DIR")]
    CompilesDirMissing { path: PathBuf },

    /// `CHECK_INTERVAL` was not a positive integer number of seconds.
    #[error("CHECK_INTERVAL must be a positive integer number of seconds, got '{value}'")]
    InvalidInterval { value: String },
}

/// Errors raised while reading a per-directory descriptor.
///
/// All variants are per-directory: the scan loop logs them and moves on.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not a JSON object of the expected shape.
    #[error("invalid JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor parsed but names no repository.
    #[error("no gitrepo found in {path}")]
    MissingRepository { path: PathBuf },
}
