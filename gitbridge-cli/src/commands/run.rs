//! `gitbridge run`: foreground polling daemon.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use gitbridge_daemon::{start_blocking, LogFormat};

use super::load_settings;
use crate::GlobalArgs;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Arguments for `gitbridge run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

impl RunArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = load_settings(global)?;
        start_blocking(settings, self.log_format.into()).context("gitbridge exited with error")
    }
}
