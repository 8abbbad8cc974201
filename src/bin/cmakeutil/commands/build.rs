//! `cmakeutil build` command

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use cmakeutil::ops::{build_ext, plan_build_ext, BuildExtOptions, BuildType};
use cmakeutil::{CMakeInvoker, DriverConfig};

pub fn execute(mut config: DriverConfig, args: BuildArgs) -> Result<()> {
    if let Some(generator) = args.generator {
        config.generator = generator;
    }
    if let Some(prefix) = args.prefix {
        config.dist_dir = prefix;
    }
    config.defines.extend(args.defines);

    let opts = BuildExtOptions {
        // --release and --debug conflict; neither means Release.
        build_type: BuildType::from_debug(args.debug && !args.release),
        force_configure: args.force_configure,
        jobs: args.jobs,
        extensions: args.extensions,
        env: None,
    };

    if args.plan {
        let invoker = CMakeInvoker::new(config.cmake.as_ref(), config.ctest.as_ref())?;
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        let plan = plan_build_ext(&invoker, &config, &opts, &cwd);
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let result = build_ext(&config, &opts)?;

    eprintln!(
        "    Finished {} -> {}",
        result.build_type,
        result.dist_dir.display()
    );
    Ok(())
}
