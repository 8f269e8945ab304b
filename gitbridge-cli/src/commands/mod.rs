pub mod check;
pub mod run;
pub mod scan;
pub mod sync;

use anyhow::{Context, Result};

use gitbridge_core::Settings;

use crate::GlobalArgs;

/// Environment settings with command-line overrides applied.
///
/// A `.env` file in the working directory is loaded first; variables already
/// set in the process environment keep their values.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings> {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("failed to load .env"),
    }
    let mut settings = Settings::from_env().context("invalid configuration")?;
    if let Some(dir) = &global.compiles_dir {
        settings.compiles_dir = dir.clone();
    }
    Ok(settings)
}
