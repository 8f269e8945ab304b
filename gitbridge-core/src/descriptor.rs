//! Per-directory sync descriptor (`.gitinfo` by default).
//!
//! The descriptor is a JSON object naming the remote:
//!
//! ```json
//! { "gitrepo": "https://github.com/acme/thesis.git" }
//! ```
//!
//! Extra keys are ignored. It is read fresh on every cycle.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// A validated descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDescriptor {
    pub repository_url: String,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    gitrepo: Option<String>,
}

/// Parse descriptor text read from `path` (the path is used for error context).
pub fn parse(path: &Path, text: &str) -> Result<SyncDescriptor, DescriptorError> {
    let raw: RawDescriptor =
        serde_json::from_str(text).map_err(|source| DescriptorError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    match raw.gitrepo.map(|url| url.trim().to_string()) {
        Some(url) if !url.is_empty() => Ok(SyncDescriptor {
            repository_url: url,
        }),
        _ => Err(DescriptorError::MissingRepository {
            path: path.to_path_buf(),
        }),
    }
}

/// Read `<dir>/<filename>`.
///
/// Returns `Ok(None)` when the directory carries no descriptor, which is the
/// common case and not an error.
pub fn read_at(dir: &Path, filename: &str) -> Result<Option<SyncDescriptor>, DescriptorError> {
    let path = dir.join(filename);
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).map_err(|source| DescriptorError::Io {
        path: path.clone(),
        source,
    })?;
    parse(&path, &text).map(Some)
}
