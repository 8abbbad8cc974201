//! `cmakeutil completions` command

use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionsArgs};

pub fn execute(args: CompletionsArgs) -> Result<()> {
    let stdout = io::stdout();
    write_completions(args.shell, &mut stdout.lock())?;
    Ok(())
}

/// Write the completion script for `shell` to `out`.
fn write_completions(shell: Shell, out: &mut dyn Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "cmakeutil", out);
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completions_cover_build_flags() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out).unwrap();

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("cmakeutil"));
        assert!(script.contains("--force-configure"));
        assert!(script.contains("--release"));
    }
}
