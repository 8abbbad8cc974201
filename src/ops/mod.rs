//! High-level operations.
//!
//! Each operation takes a [`DriverConfig`](crate::util::config::DriverConfig)
//! built once by the caller.

pub mod build_ext;
pub mod clean;
pub mod run_tests;

pub use build_ext::{
    build_ext, build_ext_with, plan_build_ext, BuildExtOptions, BuildExtResult, BuildPlan,
    BuildType, PlannedCommand,
};
pub use clean::clean;
pub use run_tests::{run_tests, run_tests_with, RunTestsOptions};
