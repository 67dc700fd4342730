//! `preview` command: show how a file would be mapped

use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::cli::output::{print_mapping, print_preview};
use crate::import::{ImportSession, TaskField};

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Spreadsheet to inspect (.xlsx, .xls or .csv)
    pub file: PathBuf,
}

pub fn handle_preview_command(args: &PreviewArgs) -> Result<()> {
    // Project id is irrelevant here; nothing is imported
    let mut session = ImportSession::new(0);
    session.load_file(&args.file)?;

    let Some(sheet) = session.sheet() else {
        return Ok(());
    };

    println!(
        "{} {} data rows, {} columns",
        args.file.display().to_string().cyan(),
        sheet.row_count().to_string().bold(),
        sheet.headers.len()
    );
    println!("Columns: {}", sheet.headers.join(", ").dimmed());
    println!();
    print_mapping(session.mapping());
    println!();
    print_preview(sheet, session.mapping());

    if session.mapping().column(TaskField::Title).is_none() {
        println!();
        println!(
            "{}",
            "No title column recognized; pass --map title=<Column> when importing.".yellow()
        );
    }
    Ok(())
}
