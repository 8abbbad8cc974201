//! Command implementations

pub mod build;
pub mod check;
pub mod clean;
pub mod completions;

use anyhow::{Context, Result};

use crate::cli::Cli;
use cmakeutil::DriverConfig;

/// Load config files for the current directory and apply global flags.
pub fn driver_config(cli: &Cli) -> Result<DriverConfig> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let mut config = DriverConfig::discover(&cwd)?;

    if let Some(ref dir) = cli.build_dir {
        config.build_dir = dir.clone();
    }
    if let Some(ref cmake) = cli.cmake {
        config.cmake = Some(cmake.clone());
    }
    if let Some(ref ctest) = cli.ctest {
        config.ctest = Some(ctest.clone());
    }

    tracing::debug!("driver config: {:?}", config);
    Ok(config)
}
