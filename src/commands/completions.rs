use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Command};
use clap_complete::{generate, Shell};
use std::io;

/// Parse a shell name as accepted by `silo completions`
pub fn parse_shell(shell_str: &str) -> Option<Shell> {
    match shell_str.to_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "powershell" => Some(Shell::PowerShell),
        "elvish" => Some(Shell::Elvish),
        _ => None,
    }
}

/// Generate shell completions for the specified shell
pub fn execute(matches: &ArgMatches, cli: &mut Command) -> Result<()> {
    let shell_str = matches
        .get_one::<String>("shell")
        .context("Usage: silo completions <SHELL>")?;

    let Some(shell) = parse_shell(shell_str) else {
        bail!(
            "Unsupported shell: {} (supported: bash, zsh, fish, powershell, elvish)",
            shell_str
        );
    };

    generate(shell, cli, "silo", &mut io::stdout());
    Ok(())
}
