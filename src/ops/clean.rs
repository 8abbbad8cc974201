//! Remove a previous CMake configuration.

use anyhow::{Context, Result};

use crate::cmake::{clear, configured};
use crate::util::config::DriverConfig;

/// Empty the build directory. Returns whether it held a configured tree.
pub fn clean(config: &DriverConfig) -> Result<bool> {
    let build_dir = &config.build_dir;
    let was_configured = configured(build_dir);

    clear(build_dir).with_context(|| format!("failed to clear {}", build_dir.display()))?;

    Ok(was_configured)
}
