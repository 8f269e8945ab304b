//! `gitbridge sync`: mirror one directory now.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use gitbridge_daemon::{init_tracing, LogFormat};
use gitbridge_sync::{sync_directory, DirectoryOutcome, SyncEngine, SyncOutcome};

use super::load_settings;
use crate::GlobalArgs;

/// Arguments for `gitbridge sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Directory holding the project files and its descriptor.
    pub dir: PathBuf,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        if !self.dir.is_dir() {
            bail!("{} is not a directory", self.dir.display());
        }
        let dir = std::fs::canonicalize(&self.dir)
            .with_context(|| format!("cannot resolve {}", self.dir.display()))?;
        let settings = load_settings(global)?;
        init_tracing(LogFormat::Text);

        let descriptor_filename = settings.descriptor_filename.clone();
        let engine = SyncEngine::new(settings);

        match sync_directory(&engine, &dir) {
            DirectoryOutcome::NoDescriptor => bail!(
                "no {descriptor_filename} descriptor in {}",
                dir.display()
            ),
            DirectoryOutcome::Invalid(err) => {
                Err(err).with_context(|| format!("cannot sync {}", dir.display()))
            }
            DirectoryOutcome::Failed(err) => Err(err.into()),
            DirectoryOutcome::Synced(report) => {
                match report.outcome {
                    SyncOutcome::Pushed { message } => println!(
                        "{} '{}' pushed to {} ({message})",
                        "✓".green(),
                        report.folder,
                        report.repository_url
                    ),
                    SyncOutcome::NoChanges => println!(
                        "{} '{}' already up to date with {}",
                        "·".dimmed(),
                        report.folder,
                        report.repository_url
                    ),
                }
                Ok(())
            }
        }
    }
}
