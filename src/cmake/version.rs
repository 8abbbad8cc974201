//! CMake version checks.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use super::CMakeError;
use crate::util::process::ProcessBuilder;

/// Oldest CMake release the configure arguments are valid for (`-S`/`-B`).
pub const MIN_CMAKE_VERSION: Version = Version::new(3, 5, 0);

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^cmake version ([\d.]+)").expect("version regex is valid")
});

/// Extract the version from `cmake --version` output.
///
/// Missing components are treated as zero and components past the third
/// are ignored, so `3.5` is `3.5.0` and `3.10.2.1` is `3.10.2`.
pub fn parse_version(output: &str) -> Option<Version> {
    let captures = VERSION_RE.captures(output)?;
    let mut parts = captures[1]
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>());

    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Check a parsed version against [`MIN_CMAKE_VERSION`].
pub fn check_version(found: Version) -> Result<Version, CMakeError> {
    if found < MIN_CMAKE_VERSION {
        return Err(CMakeError::VersionTooOld {
            found,
            required: MIN_CMAKE_VERSION,
        });
    }
    Ok(found)
}

/// Run `<cmake> --version` and make sure it is new enough.
pub fn validate(cmake: &Path) -> Result<Version, CMakeError> {
    let output = ProcessBuilder::new(cmake).arg("--version").exec()?;

    if !output.status.success() {
        return Err(CMakeError::VersionQueryFailed {
            path: cmake.to_path_buf(),
            code: output.status.code(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_version(&stdout).ok_or_else(|| CMakeError::VersionUnparseable {
        path: cmake.to_path_buf(),
        output: stdout.trim().to_string(),
    })?;

    tracing::debug!("{} reports version {}", cmake.display(), version);
    check_version(version)
}
