//! `cmakeutil check` command

use anyhow::Result;

use cmakeutil::cmake::{find_executable, CMakeInvoker, MIN_CMAKE_VERSION};
use cmakeutil::DriverConfig;

pub fn execute(config: DriverConfig) -> Result<()> {
    let invoker = CMakeInvoker::new(config.cmake.as_ref(), config.ctest.as_ref())?;
    let version = invoker.validate()?;

    println!(
        "cmake {} at {} (>= {} required)",
        version,
        invoker.cmake_path().display(),
        MIN_CMAKE_VERSION
    );

    match config.ctest.clone().map(Ok).unwrap_or_else(|| find_executable("ctest")) {
        Ok(ctest) => println!("ctest at {}", ctest.display()),
        Err(e) => println!("ctest: {}", e),
    }
    Ok(())
}
