//! How a configure command is launched.
//!
//! Most hosts run cmake directly. On Windows the Ninja generator cannot find
//! the MSVC toolchain unless the Visual Studio developer environment has
//! been sourced first, so the command is written into a batch script that
//! calls `VsDevCmd.bat` before re-issuing the original command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::CMakeError;
use crate::util::fs::write_string;
use crate::util::process::ProcessBuilder;

/// Generator prefix that needs the developer environment on Windows.
pub const ACCELERATOR_GENERATOR: &str = "Ninja";

/// File name of the generated batch script, inside the build directory.
pub const SHIM_SCRIPT_NAME: &str = "cmake_config.bat";

/// Host operating system family, as far as launching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Other,
}

impl HostPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Other
        }
    }

    pub fn is_windows(self) -> bool {
        self == HostPlatform::Windows
    }
}

/// Turns a program and argument vector into a runnable process.
pub trait InvocationStrategy {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Prepare the process. May write files.
    fn prepare(&self, program: &Path, args: &[String]) -> Result<ProcessBuilder, CMakeError>;
}

/// Run the program as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExec;

impl InvocationStrategy for DirectExec {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn prepare(&self, program: &Path, args: &[String]) -> Result<ProcessBuilder, CMakeError> {
        Ok(ProcessBuilder::new(program).args(args))
    }
}

/// Run the program from a batch script that first sources `VsDevCmd.bat`.
#[derive(Debug, Clone)]
pub struct DevShellScript {
    vs_path: PathBuf,
    script_dir: PathBuf,
    arch: &'static str,
}

impl DevShellScript {
    pub fn new(vs_path: impl Into<PathBuf>, script_dir: impl Into<PathBuf>) -> Self {
        DevShellScript {
            vs_path: vs_path.into(),
            script_dir: script_dir.into(),
            arch: host_arch(),
        }
    }

    /// Find Visual Studio and target the script at `script_dir`.
    pub fn locate(generator: &str, script_dir: impl Into<PathBuf>) -> Result<Self, CMakeError> {
        Self::from_install(generator, find_visual_studio(), script_dir)
    }

    /// Like [`locate`](Self::locate), with the Visual Studio lookup already done.
    pub fn from_install(
        generator: &str,
        vs_path: Option<PathBuf>,
        script_dir: impl Into<PathBuf>,
    ) -> Result<Self, CMakeError> {
        let vs_path = vs_path.ok_or_else(|| CMakeError::MissingToolchain {
            generator: generator.to_string(),
        })?;
        tracing::debug!("found Visual Studio at {}", vs_path.display());
        Ok(Self::new(vs_path, script_dir))
    }

    pub fn script_path(&self) -> PathBuf {
        self.script_dir.join(SHIM_SCRIPT_NAME)
    }

    /// Contents of the batch script for `program args…`.
    pub fn render(&self, program: &Path, args: &[String]) -> String {
        let vsdevcmd = self
            .vs_path
            .join("Common7")
            .join("Tools")
            .join("VsDevCmd.bat");

        let command = std::iter::once(program.to_string_lossy().into_owned())
            .chain(args.iter().cloned())
            .map(|arg| quote_batch_arg(&arg))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "CALL \"{}\" -arch={arch} -host_arch={arch}\r\nCALL {}\r\n",
            vsdevcmd.display(),
            command,
            arch = self.arch,
        )
    }
}

impl InvocationStrategy for DevShellScript {
    fn name(&self) -> &'static str {
        "vs-dev-shell"
    }

    fn prepare(&self, program: &Path, args: &[String]) -> Result<ProcessBuilder, CMakeError> {
        let script = self.script_path();
        write_string(&script, &self.render(program, args))?;
        tracing::debug!("wrote {}", script.display());
        Ok(ProcessBuilder::new(script))
    }
}

/// Wrap arguments containing whitespace in double quotes.
pub fn quote_batch_arg(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}

/// True when `generator` on `host` needs the developer shell.
pub fn needs_dev_shell(generator: Option<&str>, host: HostPlatform) -> bool {
    host.is_windows() && generator.is_some_and(|g| g.starts_with(ACCELERATOR_GENERATOR))
}

/// Pick the strategy for a configure run.
pub fn select_strategy(
    generator: Option<&str>,
    host: HostPlatform,
    script_dir: &Path,
) -> Result<Box<dyn InvocationStrategy>, CMakeError> {
    select_strategy_with(generator, host, script_dir, find_visual_studio)
}

/// [`select_strategy`] with a custom Visual Studio lookup. `find_vs` only
/// runs when the developer shell is needed.
pub fn select_strategy_with(
    generator: Option<&str>,
    host: HostPlatform,
    script_dir: &Path,
    find_vs: impl FnOnce() -> Option<PathBuf>,
) -> Result<Box<dyn InvocationStrategy>, CMakeError> {
    match generator {
        Some(g) if needs_dev_shell(Some(g), host) => {
            Ok(Box::new(DevShellScript::from_install(g, find_vs(), script_dir)?))
        }
        _ => Ok(Box::new(DirectExec)),
    }
}

/// `amd64` on 64-bit builds, `x86` otherwise.
fn host_arch() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "amd64"
    } else {
        "x86"
    }
}

/// Find the latest Visual Studio installation via vswhere.
fn find_visual_studio() -> Option<PathBuf> {
    query_vswhere(&find_vswhere()?)
}

fn query_vswhere(vswhere: &Path) -> Option<PathBuf> {
    tracing::debug!("found vswhere at {}", vswhere.display());

    let output = Command::new(vswhere)
        .args([
            "-latest",
            "-products",
            "*",
            "-property",
            "installationPath",
            "-format",
            "value",
        ])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let path = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if path.is_empty() {
                tracing::debug!("vswhere returned empty path");
                None
            } else {
                Some(PathBuf::from(path))
            }
        }
        Ok(out) => {
            tracing::debug!("vswhere failed: {}", String::from_utf8_lossy(&out.stderr));
            None
        }
        Err(e) => {
            tracing::debug!("failed to run vswhere: {}", e);
            None
        }
    }
}

/// Find vswhere.exe in its standard location or PATH.
fn find_vswhere() -> Option<PathBuf> {
    find_vswhere_in(
        std::env::var_os("ProgramFiles(x86)"),
        std::env::var_os("PATH"),
    )
}

fn find_vswhere_in(program_files_x86: Option<OsString>, path: Option<OsString>) -> Option<PathBuf> {
    let program_files_x86 = program_files_x86
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("C:\\Program Files (x86)"));

    let standard_path = program_files_x86
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    let cwd = std::env::current_dir().ok()?;
    which::which_in("vswhere", path, cwd).ok()
}
