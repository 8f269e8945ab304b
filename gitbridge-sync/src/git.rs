//! Thin wrapper around the `git` binary.
//!
//! Output is captured as text and the token is scrubbed from argv, stdout
//! and stderr before a [`GitOutput`] or [`GitError`] is constructed, so no
//! caller ever holds the credential in captured text.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use gitbridge_core::credentials::redact;
use gitbridge_core::SecretToken;

use crate::error::GitError;

/// Captured result of a git invocation (already redacted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs git subcommands, redacting the configured token from everything it
/// captures.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: PathBuf,
    token: Option<SecretToken>,
}

impl GitRunner {
    pub fn new(token: Option<SecretToken>) -> Self {
        Self::with_program("git", token)
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>, token: Option<SecretToken>) -> Self {
        Self {
            program: program.into(),
            token,
        }
    }

    /// Run `git <args>` and return its output even when it exits non-zero.
    ///
    /// Only a failure to start git at all is an error here.
    pub fn run_unchecked<I, S>(&self, args: I, cwd: Option<&Path>) -> Result<GitOutput, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = collect_args(args);
        self.execute(&args, cwd)
    }

    /// Run `git <args>`; a non-zero exit becomes [`GitError::Failed`].
    pub fn run<I, S>(&self, args: I, cwd: Option<&Path>) -> Result<GitOutput, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = collect_args(args);
        let output = self.execute(&args, cwd)?;
        if output.success {
            return Ok(output);
        }

        let shown = self.describe(&args);
        let status = match output.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        tracing::warn!("git command failed: git {shown}: {}", output.stderr.trim());
        Err(GitError::Failed {
            args: shown,
            status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Whether `repo_dir` has any tracked files. Errors count as "no".
    pub fn has_tracked_files(&self, repo_dir: &Path) -> bool {
        match self.run_unchecked(["ls-files"], Some(repo_dir)) {
            Ok(output) => output.success && !output.stdout.trim().is_empty(),
            Err(err) => {
                tracing::warn!("error checking for tracked files: {err}");
                false
            }
        }
    }

    fn execute(&self, args: &[OsString], cwd: Option<&Path>) -> Result<GitOutput, GitError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("git {}", self.describe(args));
        let output = cmd.output().map_err(|e| GitError::Spawn {
            args: self.describe(args),
            message: self.scrub(&e.to_string()),
        })?;

        Ok(GitOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: self.scrub(&String::from_utf8_lossy(&output.stdout)),
            stderr: self.scrub(&String::from_utf8_lossy(&output.stderr)),
        })
    }

    /// Redacted, space-joined argv for messages.
    fn describe(&self, args: &[OsString]) -> String {
        let joined = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        self.scrub(&joined)
    }

    fn scrub(&self, text: &str) -> String {
        redact(text, self.token.as_ref())
    }
}

fn collect_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter().map(|a| a.as_ref().to_os_string()).collect()
}
