//! Errors raised while locating or driving CMake.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error from a CMake or CTest invocation.
///
/// Every variant is fatal to the operation that produced it; nothing in
/// this crate retries.
#[derive(Debug, Error)]
pub enum CMakeError {
    #[error("`{program}` not found in PATH or any known install location")]
    NotFound { program: String },

    #[error("CMake ({}) failed to execute with --version (exit code {code:?})", path.display())]
    VersionQueryFailed { path: PathBuf, code: Option<i32> },

    #[error("CMake ({}) failed to provide valid version information", path.display())]
    VersionUnparseable { path: PathBuf, output: String },

    #[error("CMake >= {required} is required, found {found}")]
    VersionTooOld {
        found: semver::Version,
        required: semver::Version,
    },

    #[error("unknown {operation} option `{key}`")]
    UnknownKey { operation: &'static str, key: String },

    #[error("option `{key}` expects {expected}")]
    InvalidValue { key: String, expected: &'static str },

    #[error("cannot use the {generator} generator because MSVC is not found")]
    MissingToolchain { generator: String },

    #[error("`{command}` failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CMakeError {
    /// True for the errors that mean "no usable CMake on this machine".
    pub fn is_missing_cmake(&self) -> bool {
        matches!(
            self,
            CMakeError::NotFound { .. }
                | CMakeError::VersionQueryFailed { .. }
                | CMakeError::VersionUnparseable { .. }
                | CMakeError::VersionTooOld { .. }
                | CMakeError::Spawn { .. }
        )
    }
}
