//! `gitbridge scan`: one cycle over the watched root.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gitbridge_core::Cancellation;
use gitbridge_daemon::{init_tracing, LogFormat};
use gitbridge_sync::{scan_cycle, CycleReport, SyncEngine};

use super::load_settings;
use crate::GlobalArgs;

/// Arguments for `gitbridge scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Emit the cycle report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = load_settings(global)?;
        settings
            .validate_compiles_dir()
            .context("cannot scan")?;
        init_tracing(LogFormat::Text);

        let engine = SyncEngine::new(settings);
        let report = scan_cycle(&engine, &Cancellation::new());

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render report JSON")?
            );
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &CycleReport) {
    println!(
        "scanned {} folder(s) in {} ms: {} pushed, {} unchanged, {} failed, {} invalid",
        report.attempted() + report.invalid.len() + report.skipped.len(),
        report.duration_ms,
        report.pushed.len(),
        report.unchanged.len(),
        report.failed.len(),
        report.invalid.len(),
    );

    for folder in &report.pushed {
        println!("  {} {folder}", "pushed   ".green());
    }
    for folder in &report.unchanged {
        println!("  {} {folder}", "unchanged".dimmed());
    }
    for failure in &report.failed {
        let stage = failure
            .stage
            .map(|s| format!(" (at {s})"))
            .unwrap_or_default();
        println!(
            "  {} {}{stage}: {}",
            "failed   ".red(),
            failure.folder,
            failure.error
        );
    }
    for failure in &report.invalid {
        println!(
            "  {} {}: {}",
            "invalid  ".yellow(),
            failure.folder,
            failure.error
        );
    }
    if report.attempted() == 0 && report.invalid.is_empty() {
        println!("No folders with a descriptor found.");
    }
}
