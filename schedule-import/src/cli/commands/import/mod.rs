//! `import` command

mod handler;

use clap::Args;
use std::path::PathBuf;

pub use handler::handle_import_command;

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Spreadsheet to import (.xlsx, .xls or .csv)
    pub file: PathBuf,

    /// Target project id
    #[arg(short, long)]
    pub project: i64,

    /// Map a field to a column, e.g. --map assignee=Responsable (repeatable)
    #[arg(short, long, value_name = "FIELD=COLUMN")]
    pub map: Vec<String>,

    /// Leave a field unmapped (repeatable)
    #[arg(long, value_name = "FIELD")]
    pub unmap: Vec<String>,

    /// Import without the interactive review
    #[arg(short, long)]
    pub yes: bool,

    /// Print the tasks that would be created without calling the API
    #[arg(long)]
    pub dry_run: bool,
}
