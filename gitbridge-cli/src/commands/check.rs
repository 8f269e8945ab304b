//! `gitbridge check`: show effective settings.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use super::load_settings;
use crate::GlobalArgs;

/// Arguments for `gitbridge check`.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = load_settings(global)?;

        let token = match &settings.github_token {
            Some(token) => token.to_string(),
            None => "(not set: public remotes only)".yellow().to_string(),
        };
        let template = settings
            .gitignore_template
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());

        println!("github token       {token}");
        println!("compiles dir       {}", settings.compiles_dir.display());
        println!("workspace root     {}", settings.workspace_root.display());
        println!("gitignore template {template}");
        println!(
            "git identity       {} <{}>",
            settings.git_user_name, settings.git_user_email
        );
        println!("descriptor file    {}", settings.descriptor_filename);
        println!("commit message     {}", settings.commit_message_template);
        println!("check interval     {}s", settings.check_interval.as_secs());

        if let Err(err) = settings.validate_compiles_dir() {
            println!("{} {err}", "✗".red());
            bail!("configuration check failed");
        }
        println!("{} compiles dir exists", "✓".green());
        Ok(())
    }
}
