//! `cmakeutil clean` command

use anyhow::Result;

use cmakeutil::ops::clean;
use cmakeutil::DriverConfig;

pub fn execute(config: DriverConfig) -> Result<()> {
    if clean(&config)? {
        eprintln!("     Removed configuration in {}", config.build_dir.display());
    } else {
        eprintln!("     Cleared {}", config.build_dir.display());
    }
    Ok(())
}
