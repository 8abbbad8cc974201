//! cmakeutil - drive CMake from a packaging step
//!
//! This crate locates CMake, checks its version, and runs the configure,
//! build, install and test steps needed to compile a native extension.

pub mod cmake;
pub mod ops;
pub mod util;

pub use cmake::{CMakeError, CMakeInvoker, CTestRunner};
pub use util::config::DriverConfig;
