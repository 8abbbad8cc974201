//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.cmakeutil/config.toml` - User-wide defaults
//! - Project: `.cmakeutil/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. The merged result is
//! turned into a [`DriverConfig`] once, at the entry point, and passed down
//! explicitly from there.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cmake::CacheEntry;

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default install prefix for the packaged files.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Default CMake generator.
pub const DEFAULT_GENERATOR: &str = "Ninja";

/// On-disk configuration, as read from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Project layout
    pub paths: PathsConfig,

    /// CMake settings
    pub cmake: CMakeConfig,
}

/// Project layout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the CMake project (default: `.`)
    pub source_dir: Option<PathBuf>,

    /// CMake build tree (default: `build`)
    pub build_dir: Option<PathBuf>,

    /// Install prefix for the packaged files (default: `dist`)
    pub dist_dir: Option<PathBuf>,
}

/// CMake-related settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CMakeConfig {
    /// Generator passed as `-G` (default: `Ninja`)
    pub generator: Option<String>,

    /// Re-configure on every build instead of once
    pub force_configure: bool,

    /// Explicit path to the cmake executable
    pub cmake: Option<PathBuf>,

    /// Explicit path to the ctest executable
    pub ctest: Option<PathBuf>,

    /// Extra cache entries passed at configure time
    pub defines: Vec<CacheEntry>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or defaults if the file doesn't exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.paths.source_dir.is_some() {
            self.paths.source_dir = other.paths.source_dir;
        }
        if other.paths.build_dir.is_some() {
            self.paths.build_dir = other.paths.build_dir;
        }
        if other.paths.dist_dir.is_some() {
            self.paths.dist_dir = other.paths.dist_dir;
        }

        if other.cmake.generator.is_some() {
            self.cmake.generator = other.cmake.generator;
        }
        if other.cmake.force_configure {
            self.cmake.force_configure = true;
        }
        if other.cmake.cmake.is_some() {
            self.cmake.cmake = other.cmake.cmake;
        }
        if other.cmake.ctest.is_some() {
            self.cmake.ctest = other.cmake.ctest;
        }
        if !other.cmake.defines.is_empty() {
            self.cmake.defines = other.cmake.defines;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cmakeutil/config.toml)
/// 2. Global config (~/.cmakeutil/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path)?);
    }
    config.merge(Config::load_or_default(project_path)?);

    Ok(config)
}

/// Get the global config directory (~/.cmakeutil).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cmakeutil"))
}

/// Get the global config path (~/.cmakeutil/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.cmakeutil/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".cmakeutil").join("config.toml")
}

/// Resolved settings for the build driver.
///
/// Every field has a concrete value; this is what the operations in
/// [`crate::ops`] consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub generator: String,
    pub force_configure: bool,
    pub cmake: Option<PathBuf>,
    pub ctest: Option<PathBuf>,
    pub defines: Vec<CacheEntry>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            source_dir: PathBuf::from("."),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            generator: DEFAULT_GENERATOR.to_string(),
            force_configure: false,
            cmake: None,
            ctest: None,
            defines: Vec::new(),
        }
    }
}

impl From<Config> for DriverConfig {
    fn from(config: Config) -> Self {
        let defaults = DriverConfig::default();
        DriverConfig {
            source_dir: config.paths.source_dir.unwrap_or(defaults.source_dir),
            build_dir: config.paths.build_dir.unwrap_or(defaults.build_dir),
            dist_dir: config.paths.dist_dir.unwrap_or(defaults.dist_dir),
            generator: config.cmake.generator.unwrap_or(defaults.generator),
            force_configure: config.cmake.force_configure,
            cmake: config.cmake.cmake,
            ctest: config.cmake.ctest,
            defines: config.cmake.defines,
        }
    }
}

impl DriverConfig {
    /// Load and merge the global and project config files for `project_root`.
    pub fn discover(project_root: &Path) -> Result<Self> {
        let global = global_config_path();
        Ok(load_config(global.as_deref(), &project_config_path(project_root))?.into())
    }
}
