//! `template` command

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::import::template::write_template;

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Output path (.xlsx)
    pub output: PathBuf,

    /// Include two example rows (a parent task and a subtask)
    #[arg(long)]
    pub example: bool,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn handle_template_command(args: &TemplateArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    write_template(&args.output, args.example)?;
    println!(
        "Template written to {}",
        args.output.display().to_string().bright_green()
    );
    Ok(())
}
