//! schedule-import: load project schedules from spreadsheets into the task API

use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod config;
mod import;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    cli::run(cli).await
}
