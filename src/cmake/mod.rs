//! Driving CMake and CTest.
//!
//! [`CMakeInvoker`] owns the resolved executables and runs the four
//! operations (configure, build, install, test). Each operation translates
//! its option set into an argument vector (see [`options`]), runs the
//! external command to completion, and turns a non-zero exit status into
//! [`CMakeError::CommandFailed`].

mod errors;
pub mod locate;
pub mod options;
pub mod strategy;
pub mod version;

use std::path::{Path, PathBuf};

use semver::Version;

pub use errors::CMakeError;
pub use locate::{find_executable, resolve_executable};
pub use options::{
    default_parallelism, BuildOptions, CacheEntry, ConfigureOptions, Environment,
    InstallOptions, OptionValue, OptionsBag, TestOptions,
};
pub use strategy::{select_strategy, DevShellScript, DirectExec, HostPlatform, InvocationStrategy};
pub use version::{validate, MIN_CMAKE_VERSION};

use crate::util::fs::remove_dir_contents;
use crate::util::process::ProcessBuilder;

/// File whose presence marks a configured build tree.
pub const CACHE_FILE: &str = "CMakeCache.txt";

fn current_dir() -> Result<PathBuf, CMakeError> {
    Ok(std::env::current_dir()?)
}

/// True if `build_dir` (relative to the working directory) has been
/// configured.
pub fn configured(build_dir: &Path) -> bool {
    match std::env::current_dir() {
        Ok(cwd) => configured_in(&cwd, build_dir),
        Err(_) => build_dir.join(CACHE_FILE).is_file(),
    }
}

/// Like [`configured`], resolving `build_dir` against `cwd`.
pub fn configured_in(cwd: &Path, build_dir: &Path) -> bool {
    cwd.join(build_dir).join(CACHE_FILE).is_file()
}

/// Empty a build directory, keeping the directory itself.
pub fn clear(build_dir: &Path) -> Result<(), CMakeError> {
    tracing::debug!("clearing {}", build_dir.display());
    remove_dir_contents(build_dir)?;
    Ok(())
}

/// Resolved cmake (and optionally ctest) executables.
#[derive(Debug, Clone)]
pub struct CMakeInvoker {
    cmake: PathBuf,
    ctest: Option<PathBuf>,
    host: HostPlatform,
}

impl CMakeInvoker {
    /// Locate cmake, honoring an explicit path. ctest is resolved on first
    /// use unless given here.
    pub fn new(cmake: Option<&PathBuf>, ctest: Option<&PathBuf>) -> Result<Self, CMakeError> {
        Ok(CMakeInvoker {
            cmake: resolve_executable(cmake, "cmake")?,
            ctest: ctest.cloned(),
            host: HostPlatform::current(),
        })
    }

    /// Use exactly these paths without searching.
    pub fn with_paths(cmake: impl Into<PathBuf>, ctest: Option<PathBuf>) -> Self {
        CMakeInvoker {
            cmake: cmake.into(),
            ctest,
            host: HostPlatform::current(),
        }
    }

    /// Override the host platform used to pick a launch strategy.
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    pub fn cmake_path(&self) -> &Path {
        &self.cmake
    }

    /// Check that cmake runs and is recent enough.
    pub fn validate(&self) -> Result<Version, CMakeError> {
        validate(&self.cmake)
    }

    /// Prepare a configure run without executing it.
    ///
    /// With the developer-shell strategy this writes the batch script.
    pub fn configure_command(
        &self,
        opts: &ConfigureOptions,
        cwd: &Path,
    ) -> Result<ProcessBuilder, CMakeError> {
        let args = opts.to_args(cwd);
        let script_dir = opts
            .resolved_build_dir(cwd)
            .unwrap_or_else(|| cwd.to_path_buf());
        let strategy = select_strategy(opts.generator.as_deref(), self.host, &script_dir)?;
        tracing::debug!("configure strategy: {}", strategy.name());

        Ok(strategy
            .prepare(&self.cmake, &args)?
            .env_exact(opts.env.clone()))
    }

    /// Generate the project build system.
    pub fn configure(&self, opts: &ConfigureOptions) -> Result<(), CMakeError> {
        self.configure_command(opts, &current_dir()?)?.run()
    }

    /// Prepare `cmake --build` without executing it.
    pub fn build_command(&self, dir: &Path, opts: &BuildOptions) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .args(opts.to_args(dir))
            .env_exact(opts.env.clone())
    }

    /// Build an already configured tree.
    pub fn build(&self, dir: &Path, opts: &BuildOptions) -> Result<(), CMakeError> {
        self.build_command(dir, opts).run()
    }

    /// Prepare `cmake --install` without executing it.
    pub fn install_command(&self, dir: &Path, opts: &InstallOptions, cwd: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .args(opts.to_args(dir, cwd))
            .env_exact(opts.env.clone())
    }

    /// Install a built tree.
    pub fn install(&self, dir: &Path, opts: &InstallOptions) -> Result<(), CMakeError> {
        self.install_command(dir, opts, &current_dir()?).run()
    }

    /// Prepare a ctest run inside `dir` without executing it.
    pub fn test_command(&self, dir: &Path, opts: &TestOptions) -> Result<ProcessBuilder, CMakeError> {
        Ok(CTestRunner::new(self.ctest.as_ref())?.test_command(dir, opts))
    }

    /// Run the project's tests.
    pub fn test(&self, dir: &Path, opts: &TestOptions) -> Result<(), CMakeError> {
        self.test_command(dir, opts)?.run()
    }
}

/// Resolved ctest executable. Running tests never needs cmake.
#[derive(Debug, Clone)]
pub struct CTestRunner {
    ctest: PathBuf,
}

impl CTestRunner {
    /// Locate ctest, honoring an explicit path.
    pub fn new(ctest: Option<&PathBuf>) -> Result<Self, CMakeError> {
        Ok(CTestRunner {
            ctest: resolve_executable(ctest, "ctest")?,
        })
    }

    pub fn with_path(ctest: impl Into<PathBuf>) -> Self {
        CTestRunner {
            ctest: ctest.into(),
        }
    }

    pub fn ctest_path(&self) -> &Path {
        &self.ctest
    }

    /// Prepare a ctest run inside `dir` without executing it.
    pub fn test_command(&self, dir: &Path, opts: &TestOptions) -> ProcessBuilder {
        ProcessBuilder::new(&self.ctest)
            .args(opts.to_args())
            .cwd(dir)
            .env_exact(opts.env.clone())
    }

    /// Run the project's tests.
    pub fn test(&self, dir: &Path, opts: &TestOptions) -> Result<(), CMakeError> {
        self.test_command(dir, opts).run()
    }
}
