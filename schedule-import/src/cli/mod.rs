//! Command-line interface

pub mod commands;
pub mod output;
pub mod review;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::config::ConfigCommands;
use commands::import::ImportArgs;
use commands::preview::PreviewArgs;
use commands::template::TemplateArgs;

#[derive(Parser)]
#[command(
    name = "schedule-import",
    version,
    about = "Import project schedules from Excel or CSV into the task API",
    long_about = "Reads the first sheet of an .xlsx, .xls or .csv file, maps its columns to task\n\
                  fields and creates the tasks in a project. Rows with a parent task are created\n\
                  after all parents so they can be linked by name."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API base URL, overrides config and environment
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import tasks from a spreadsheet into a project
    Import(ImportArgs),
    /// Show how a spreadsheet would be mapped, without importing
    Preview(PreviewArgs),
    /// Write an empty .xlsx template with recognized headers
    Template(TemplateArgs),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Cli {
    /// Log filter for the `-v` count; `RUST_LOG` still takes precedence
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Effective configuration: file, then environment, then flags
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config.as_deref())?.with_api_url(self.api_url.clone());
        config.validate()?;
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Commands::Import(args) => {
            let config = cli.load_config()?;
            commands::import::handle_import_command(args, &config).await
        }
        Commands::Preview(args) => commands::preview::handle_preview_command(args),
        Commands::Template(args) => commands::template::handle_template_command(args),
        Commands::Config(cmd) => commands::config::handle_config_command(cmd, &cli),
    }
}
