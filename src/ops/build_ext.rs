//! Configure, build and install the native extension.
//!
//! This is the lifecycle a packaging step runs: make sure CMake is usable,
//! configure the build tree once (or every time when forced), build it,
//! and install the result into the distribution directory.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::Serialize;

use crate::cmake::{
    clear, configured, configured_in, BuildOptions, CMakeError, CMakeInvoker, CacheEntry,
    ConfigureOptions, Environment, InstallOptions,
};
use crate::util::config::DriverConfig;

/// CMake build type, also used as the multi-config `--config` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl BuildType {
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            BuildType::Debug
        } else {
            BuildType::Release
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`build_ext`].
#[derive(Debug, Clone, Default)]
pub struct BuildExtOptions {
    pub build_type: BuildType,

    /// Clear and re-configure even if the tree is already configured.
    /// Combined with `DriverConfig::force_configure`.
    pub force_configure: bool,

    /// Maximum parallel build jobs (None = CPU count - 1)
    pub jobs: Option<usize>,

    /// Extension names, only used in error messages
    pub extensions: Vec<String>,

    /// Environment for every CMake run (None = inherit)
    pub env: Option<Environment>,
}

/// What [`build_ext`] did.
#[derive(Debug, Clone)]
pub struct BuildExtResult {
    pub cmake_version: Version,
    pub build_type: BuildType,
    /// Whether the configure step ran
    pub configured: bool,
    pub dist_dir: PathBuf,
}

/// Run the full lifecycle, locating cmake from `config`.
pub fn build_ext(config: &DriverConfig, opts: &BuildExtOptions) -> Result<BuildExtResult> {
    let invoker = CMakeInvoker::new(config.cmake.as_ref(), config.ctest.as_ref())
        .map_err(|e| missing_cmake(e, &opts.extensions))?;
    build_ext_with(&invoker, config, opts)
}

/// Run the full lifecycle with an already resolved invoker.
pub fn build_ext_with(
    invoker: &CMakeInvoker,
    config: &DriverConfig,
    opts: &BuildExtOptions,
) -> Result<BuildExtResult> {
    let cmake_version = invoker.validate().map_err(|e| {
        if e.is_missing_cmake() {
            missing_cmake(e, &opts.extensions)
        } else {
            e.into()
        }
    })?;
    tracing::debug!("using cmake {} ({})", cmake_version, invoker.cmake_path().display());

    let build_type = opts.build_type;
    let build_dir = &config.build_dir;
    tracing::info!("Building {} configuration", build_type);

    let mut has_cache = configured(build_dir);
    if (config.force_configure || opts.force_configure) && has_cache {
        tracing::info!("Removing previous CMake project configuration");
        clear(build_dir)
            .with_context(|| format!("failed to clear {}", build_dir.display()))?;
        has_cache = false;
    }

    let needs_configure = !has_cache;
    if needs_configure {
        tracing::info!("Configuring CMake project");
        invoker
            .configure(&configure_options(config, opts))
            .context("CMake configuration failed")?;
    }

    tracing::info!("Building CMake project");
    invoker
        .build(build_dir, &build_options(opts))
        .context("CMake build failed")?;

    tracing::info!("Installing CMake project");
    invoker
        .install(build_dir, &install_options(config, opts))
        .context("CMake install failed")?;

    Ok(BuildExtResult {
        cmake_version,
        build_type,
        configured: needs_configure,
        dist_dir: config.dist_dir.clone(),
    })
}

/// One external command in a build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub step: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PlannedCommand {
    fn new(step: &'static str, program: &Path, args: Vec<String>) -> Self {
        PlannedCommand {
            step,
            program: program.to_path_buf(),
            args,
        }
    }
}

/// What [`build_ext_with`] would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    /// Build directory emptied before configuring, when a configured tree
    /// is re-configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear: Option<PathBuf>,

    pub commands: Vec<PlannedCommand>,
}

impl BuildPlan {
    pub fn steps(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.step).collect()
    }
}

/// Plan the lifecycle without running anything.
///
/// The configure step is included only when the build tree is not yet
/// configured (or a re-configure is forced). It is shown as a direct cmake
/// call even where it would be wrapped in a developer-shell script.
pub fn plan_build_ext(
    invoker: &CMakeInvoker,
    config: &DriverConfig,
    opts: &BuildExtOptions,
    cwd: &Path,
) -> BuildPlan {
    let cmake = invoker.cmake_path();
    let build_dir = &config.build_dir;
    let mut commands = Vec::new();

    let force = config.force_configure || opts.force_configure;
    let has_cache = configured_in(cwd, build_dir);
    let clear = (force && has_cache).then(|| cwd.join(build_dir));

    if force || !has_cache {
        commands.push(PlannedCommand::new(
            "configure",
            cmake,
            configure_options(config, opts).to_args(cwd),
        ));
    }
    commands.push(PlannedCommand::new(
        "build",
        cmake,
        build_options(opts).to_args(build_dir),
    ));
    commands.push(PlannedCommand::new(
        "install",
        cmake,
        install_options(config, opts).to_args(build_dir, cwd),
    ));

    BuildPlan { clear, commands }
}

fn configure_options(config: &DriverConfig, opts: &BuildExtOptions) -> ConfigureOptions {
    let configure = ConfigureOptions::new()
        .source_dir(&config.source_dir)
        .build_dir(&config.build_dir)
        .generator(&config.generator)
        .define(CacheEntry::typed(
            "CMAKE_BUILD_TYPE",
            "STRING",
            opts.build_type.as_str(),
        ))
        .defines(config.defines.iter().cloned());
    ConfigureOptions {
        env: opts.env.clone(),
        ..configure
    }
}

fn build_options(opts: &BuildExtOptions) -> BuildOptions {
    BuildOptions {
        parallel: opts.jobs,
        config: Some(opts.build_type.as_str().to_string()),
        env: opts.env.clone(),
        ..BuildOptions::default()
    }
}

fn install_options(config: &DriverConfig, opts: &BuildExtOptions) -> InstallOptions {
    InstallOptions {
        prefix: Some(config.dist_dir.clone()),
        config: Some(opts.build_type.as_str().to_string()),
        env: opts.env.clone(),
        ..InstallOptions::default()
    }
}

fn missing_cmake(err: CMakeError, extensions: &[String]) -> anyhow::Error {
    let names = if extensions.is_empty() {
        "(unnamed)".to_string()
    } else {
        extensions.join(", ")
    };
    anyhow::Error::new(err).context(format!(
        "CMake must be installed to build the following extensions: {}",
        names
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_type() {
        assert_eq!(BuildType::from_debug(true).as_str(), "Debug");
        assert_eq!(BuildType::from_debug(false).to_string(), "Release");
        assert_eq!(BuildType::default(), BuildType::Release);
    }

    #[test]
    fn test_plan_build_ext_fresh_tree() {
        let tmp = tempfile::TempDir::new().unwrap();
        let invoker = CMakeInvoker::with_paths("cmake", None);
        let config = DriverConfig::default();
        let opts = BuildExtOptions {
            build_type: BuildType::Debug,
            jobs: Some(2),
            ..BuildExtOptions::default()
        };

        let plan = plan_build_ext(&invoker, &config, &opts, tmp.path());

        assert_eq!(plan.steps(), ["configure", "build", "install"]);
        assert!(plan.clear.is_none());
        let commands = &plan.commands;
        assert_eq!(
            commands[0].args.last().map(String::as_str),
            Some("-DCMAKE_BUILD_TYPE:STRING=Debug")
        );
        assert_eq!(
            commands[1].args,
            ["--build", "build", "--parallel", "2", "--config", "Debug"]
        );
        assert_eq!(
            commands[2].args[3],
            tmp.path().join("dist").to_string_lossy().into_owned()
        );
    }

    #[test]
    fn test_plan_build_ext_skips_configure() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("build")).unwrap();
        std::fs::write(tmp.path().join("build").join("CMakeCache.txt"), "").unwrap();

        let invoker = CMakeInvoker::with_paths("cmake", None);
        let config = DriverConfig::default();

        let plan = plan_build_ext(&invoker, &config, &BuildExtOptions::default(), tmp.path());
        assert_eq!(plan.steps(), ["build", "install"]);
        assert!(plan.clear.is_none());
    }

    #[test]
    fn test_plan_build_ext_forced_clears_configured_tree() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("build")).unwrap();
        std::fs::write(tmp.path().join("build").join("CMakeCache.txt"), "").unwrap();

        let invoker = CMakeInvoker::with_paths("cmake", None);
        let forced = BuildExtOptions {
            force_configure: true,
            ..BuildExtOptions::default()
        };

        let plan = plan_build_ext(&invoker, &DriverConfig::default(), &forced, tmp.path());
        assert_eq!(plan.steps(), ["configure", "build", "install"]);
        assert_eq!(plan.clear, Some(tmp.path().join("build")));

        // Nothing to clear in a tree that was never configured.
        let fresh = tempfile::TempDir::new().unwrap();
        let plan = plan_build_ext(&invoker, &DriverConfig::default(), &forced, fresh.path());
        assert_eq!(plan.steps(), ["configure", "build", "install"]);
        assert!(plan.clear.is_none());
    }

    #[test]
    fn test_build_plan_serializes_clear_only_when_set() {
        let plan = BuildPlan {
            clear: None,
            commands: vec![],
        };
        assert_eq!(serde_json::to_value(&plan).unwrap(), serde_json::json!({ "commands": [] }));

        let plan = BuildPlan {
            clear: Some(PathBuf::from("build")),
            commands: vec![],
        };
        assert_eq!(serde_json::to_value(&plan).unwrap()["clear"], "build");
    }

    #[test]
    fn test_planned_command_serializes() {
        let cmd = PlannedCommand::new("build", Path::new("cmake"), vec!["--build".to_string()]);
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "step": "build", "program": "cmake", "args": ["--build"] })
        );
    }

    #[test]
    fn test_missing_cmake_message() {
        let err = missing_cmake(
            CMakeError::NotFound {
                program: "cmake".to_string(),
            },
            &["pkg/example_module".to_string()],
        );
        let msg = format!("{:#}", err);
        assert!(msg.starts_with(
            "CMake must be installed to build the following extensions: pkg/example_module"
        ));
        assert!(msg.contains("`cmake` not found"));
    }

    #[test]
    fn test_build_ext_reports_missing_cmake() {
        let config = DriverConfig {
            cmake: Some(PathBuf::from("/nonexistent/bin/cmake")),
            ..DriverConfig::default()
        };
        let opts = BuildExtOptions {
            extensions: vec!["ext".to_string()],
            ..BuildExtOptions::default()
        };

        let err = build_ext(&config, &opts).unwrap_err();
        assert!(err
            .to_string()
            .contains("CMake must be installed to build the following extensions: ext"));
    }
}
