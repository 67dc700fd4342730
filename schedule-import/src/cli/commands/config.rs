//! `config` commands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::cli::Cli;
use crate::config::{ENV_API_URL, ENV_TIMEOUT_SECS, default_config_path};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default config file path
    Path,
}

pub fn handle_config_command(cmd: &ConfigCommands, cli: &Cli) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = cli.load_config()?;
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Path => {
            let path = default_config_path().context("Could not determine config directory")?;
            let state = if path.exists() {
                "exists".green()
            } else {
                "not created".dimmed()
            };
            println!("{} ({})", path.display(), state);
            println!(
                "{}",
                format!("Environment overrides: {}, {}", ENV_API_URL, ENV_TIMEOUT_SECS).dimmed()
            );
        }
    }
    Ok(())
}
