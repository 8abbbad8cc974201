//! cmakeutil CLI - configure, build, install and test a CMake extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cmakeutil=debug")
    } else {
        EnvFilter::new("cmakeutil=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = commands::driver_config(&cli)?;

    match cli.command {
        Commands::Build(args) => commands::build::execute(config, args),
        Commands::Test(args) => commands::test::execute(config, args),
        Commands::Clean => commands::clean::execute(config),
        Commands::Check => commands::check::execute(config),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
