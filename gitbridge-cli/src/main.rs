//! gitbridge: mirror compiled project folders into GitHub repositories.
//!
//! # Usage
//!
//! ```text
//! gitbridge [--compiles-dir <path>] run [--log-format text|json]
//! gitbridge [--compiles-dir <path>] scan [--json]
//! gitbridge [--compiles-dir <path>] sync <dir>
//! gitbridge [--compiles-dir <path>] check
//! ```
//!
//! Settings come from the environment (`GITHUB_TOKEN`, `COMPILES_DIR`,
//! `CHECK_INTERVAL`, ...); flags override them.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs, scan::ScanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gitbridge",
    version,
    about = "Mirror compiled project folders into GitHub repositories",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Watched root; overrides `COMPILES_DIR`.
    #[arg(long, global = true, value_name = "PATH")]
    pub compiles_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the watched root forever (until SIGINT/SIGTERM).
    Run(RunArgs),

    /// Run exactly one scan cycle and print its report.
    Scan(ScanArgs),

    /// Sync a single directory that carries a descriptor.
    Sync(SyncArgs),

    /// Print the effective settings and validate the watched root.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(&cli.global),
        Commands::Scan(args) => args.run(&cli.global),
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Check(args) => args.run(&cli.global),
    }
}
