//! Run the native test suite with CTest.

use anyhow::{Context, Result};

use crate::cmake::{CTestRunner, Environment, TestOptions};
use crate::util::config::DriverConfig;

/// Options for [`run_tests`].
#[derive(Debug, Clone, Default)]
pub struct RunTestsOptions {
    /// Maximum parallel test jobs (None = CPU count - 1)
    pub jobs: Option<usize>,

    /// Configuration to test, for multi-config generators
    pub build_config: Option<String>,

    /// Extra ctest arguments
    pub options: Vec<String>,

    pub env: Option<Environment>,
}

impl RunTestsOptions {
    fn to_test_options(&self) -> TestOptions {
        TestOptions {
            parallel: self.jobs,
            build_config: self.build_config.clone(),
            options: self.options.clone(),
            env: self.env.clone(),
        }
    }
}

/// Run ctest inside the configured build directory.
///
/// Only ctest is located; cmake need not be installed.
pub fn run_tests(config: &DriverConfig, opts: &RunTestsOptions) -> Result<()> {
    let runner = CTestRunner::new(config.ctest.as_ref())?;
    run_tests_with(&runner, config, opts)
}

/// Run ctest with an already resolved runner.
pub fn run_tests_with(
    runner: &CTestRunner,
    config: &DriverConfig,
    opts: &RunTestsOptions,
) -> Result<()> {
    let build_dir = &config.build_dir;
    if !build_dir.is_dir() {
        anyhow::bail!(
            "build directory `{}` does not exist\n\
             hint: run `cmakeutil build` first",
            build_dir.display()
        );
    }

    tracing::info!("Testing C++ code in {}", build_dir.display());
    runner
        .test(build_dir, &opts.to_test_options())
        .context("CTest run failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_tests_requires_build_dir() {
        let config = DriverConfig {
            build_dir: PathBuf::from("/nonexistent/build-dir"),
            ..DriverConfig::default()
        };
        let runner = CTestRunner::with_path("ctest");

        let err = run_tests_with(&runner, &config, &RunTestsOptions::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_to_test_options() {
        let opts = RunTestsOptions {
            jobs: Some(2),
            build_config: Some("Debug".to_string()),
            options: vec!["--output-on-failure".to_string()],
            env: None,
        };
        assert_eq!(
            opts.to_test_options().to_args(),
            vec!["--parallel", "2", "--build-config", "Debug", "--output-on-failure"]
        );
    }
}
