//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cmakeutil::cmake::CacheEntry;

/// cmakeutil - drive CMake to build and install a native extension
#[derive(Parser)]
#[command(name = "cmakeutil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// CMake build directory (overrides config)
    #[arg(long, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Path to the cmake executable (overrides config and PATH search)
    #[arg(long, global = true, env = "CMAKEUTIL_CMAKE")]
    pub cmake: Option<PathBuf>,

    /// Path to the ctest executable (overrides config and PATH search)
    #[arg(long, global = true, env = "CMAKEUTIL_CTEST")]
    pub ctest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure (if needed), build and install the extension
    Build(BuildArgs),

    /// Run the C++ tests with ctest
    Test(TestArgs),

    /// Remove the previous CMake configuration
    Clean,

    /// Check that a suitable CMake is installed
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build the Release configuration (default)
    #[arg(long, conflicts_with = "debug")]
    pub release: bool,

    /// Build the Debug configuration instead of Release
    #[arg(long)]
    pub debug: bool,

    /// Clear the build directory and configure again
    #[arg(long)]
    pub force_configure: bool,

    /// CMake generator (overrides config)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Install prefix (overrides config)
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Extra cache entry, `VAR[:TYPE]=VALUE`
    #[arg(short = 'D', long = "define", value_parser = parse_define)]
    pub defines: Vec<CacheEntry>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extension being built (used in error messages)
    #[arg(long = "extension")]
    pub extensions: Vec<String>,

    /// Print the commands as JSON instead of running them
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[derive(Args)]
pub struct TestArgs {
    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Configuration to test
    #[arg(short = 'C', long)]
    pub build_config: Option<String>,

    /// Extra arguments passed to ctest
    #[arg(last = true)]
    pub options: Vec<String>,
}

/// Parse `VAR[:TYPE]=VALUE` into a cache entry.
pub fn parse_define(s: &str) -> Result<CacheEntry, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VAR[:TYPE]=VALUE, got `{}`", s))?;

    let entry = match name.split_once(':') {
        Some((var, ty)) if !ty.is_empty() => CacheEntry::typed(var, ty, value),
        Some((var, _)) => CacheEntry::new(var, value),
        None => CacheEntry::new(name, value),
    };

    if entry.var.is_empty() {
        return Err(format!("missing variable name in `{}`", s));
    }
    Ok(entry)
}
