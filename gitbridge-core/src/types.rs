//! Domain types shared by the sync engine and the scheduler.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SecretToken;
use crate::credentials::inject_token;
use crate::descriptor::SyncDescriptor;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a watched source directory. Doubles as the job identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderName(pub String);

impl FolderName {
    /// The final component of `path`, if it has one.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .map(|name| Self(name.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FolderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// SyncJob
// ---------------------------------------------------------------------------

/// One directory's sync attempt within one cycle.
///
/// The authenticated URL is derived on construction, kept private, and left
/// out of `Debug`.
#[derive(Clone)]
pub struct SyncJob {
    pub source_dir: PathBuf,
    pub folder: FolderName,
    pub repository_url: String,
    authenticated_url: String,
}

impl SyncJob {
    pub fn new(
        source_dir: PathBuf,
        folder: FolderName,
        descriptor: SyncDescriptor,
        token: Option<&SecretToken>,
    ) -> Self {
        let authenticated_url = inject_token(&descriptor.repository_url, token);
        Self {
            source_dir,
            folder,
            repository_url: descriptor.repository_url,
            authenticated_url,
        }
    }

    /// The clone URL with the credential embedded. Never log this.
    pub fn authenticated_url(&self) -> &str {
        &self.authenticated_url
    }
}

impl fmt::Debug for SyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncJob")
            .field("source_dir", &self.source_dir)
            .field("folder", &self.folder)
            .field("repository_url", &self.repository_url)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative shutdown flag, checked between directories and cycles.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
