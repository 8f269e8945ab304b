//! Runtime settings, read from environment variables.
//!
//! Every variable has a default except `GITHUB_TOKEN`; a missing token puts
//! the bridge in degraded mode (public remotes only). Empty values count as
//! unset.
//!
//! ```text
//! GITHUB_TOKEN             credential embedded into github.com URLs
//! COMPILES_DIR             watched root            (/data/compiles)
//! TEMP_DIR_BASE            workspace root          (/tmp/git_operations)
//! GITIGNORE_TEMPLATE       ignore-file template    (unset)
//! GIT_USER_NAME            committer name          (GitBridge)
//! GIT_USER_EMAIL           committer email         (gitbridge@example.com)
//! GITINFO_FILENAME         descriptor file name    (.gitinfo)
//! COMMIT_MESSAGE_TEMPLATE  commit message          (Update from Overleaf ({folder_name}))
//! CHECK_INTERVAL           seconds between cycles  (300)
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::REDACTION_MARKER;
use crate::error::ConfigError;

pub const DEFAULT_COMPILES_DIR: &str = "/data/compiles";
pub const DEFAULT_WORKSPACE_ROOT: &str = "/tmp/git_operations";
pub const DEFAULT_GIT_USER_NAME: &str = "GitBridge";
pub const DEFAULT_GIT_USER_EMAIL: &str = "gitbridge@example.com";
pub const DEFAULT_DESCRIPTOR_FILENAME: &str = ".gitinfo";
pub const DEFAULT_COMMIT_MESSAGE_TEMPLATE: &str = "Update from Overleaf ({folder_name})";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Placeholder substituted by [`Settings::commit_message`].
pub const FOLDER_NAME_PLACEHOLDER: &str = "{folder_name}";

// ---------------------------------------------------------------------------
// SecretToken
// ---------------------------------------------------------------------------

/// The remote credential. Never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wraps a token; returns `None` for an empty or whitespace-only value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The raw token. Only the credential injector and redactor should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretToken({REDACTION_MARKER})")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTION_MARKER)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything the engine and scan loop need, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub github_token: Option<SecretToken>,
    pub compiles_dir: PathBuf,
    pub workspace_root: PathBuf,
    pub gitignore_template: Option<PathBuf>,
    pub git_user_name: String,
    pub git_user_email: String,
    pub descriptor_filename: String,
    pub commit_message_template: String,
    pub check_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: None,
            compiles_dir: PathBuf::from(DEFAULT_COMPILES_DIR),
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            gitignore_template: None,
            git_user_name: DEFAULT_GIT_USER_NAME.to_string(),
            git_user_email: DEFAULT_GIT_USER_EMAIL.to_string(),
            descriptor_filename: DEFAULT_DESCRIPTOR_FILENAME.to_string(),
            commit_message_template: DEFAULT_COMMIT_MESSAGE_TEMPLATE.to_string(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`; tests use this instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        let check_interval = match get("CHECK_INTERVAL") {
            Some(raw) => parse_interval(&raw)?,
            None => defaults.check_interval,
        };

        Ok(Self {
            github_token: get("GITHUB_TOKEN").and_then(SecretToken::new),
            compiles_dir: get("COMPILES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.compiles_dir),
            workspace_root: get("TEMP_DIR_BASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            gitignore_template: get("GITIGNORE_TEMPLATE").map(PathBuf::from),
            git_user_name: get("GIT_USER_NAME").unwrap_or(defaults.git_user_name),
            git_user_email: get("GIT_USER_EMAIL").unwrap_or(defaults.git_user_email),
            descriptor_filename: get("GITINFO_FILENAME").unwrap_or(defaults.descriptor_filename),
            commit_message_template: get("COMMIT_MESSAGE_TEMPLATE")
                .unwrap_or(defaults.commit_message_template),
            check_interval,
        })
    }

    /// Fails with [`ConfigError::CompilesDirMissing`] unless the watched root
    /// is an existing directory.
    pub fn validate_compiles_dir(&self) -> Result<(), ConfigError> {
        if self.compiles_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::CompilesDirMissing {
                path: self.compiles_dir.clone(),
            })
        }
    }

    /// Render the commit message for `folder_name`.
    pub fn commit_message(&self, folder_name: &str) -> String {
        self.commit_message_template
            .replace(FOLDER_NAME_PLACEHOLDER, folder_name)
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidInterval {
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
