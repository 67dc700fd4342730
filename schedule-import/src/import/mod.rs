//! Spreadsheet task import
//!
//! Pipeline: ingest a sheet, map its columns to task fields, coerce cell
//! values and create the tasks in two passes (parents, then subtasks).

pub mod assignees;
pub mod coerce;
pub mod dry_run;
pub mod executor;
pub mod ingest;
pub mod mapping;
pub mod session;
pub mod template;
pub mod value;

pub use assignees::AssigneeDirectory;
pub use dry_run::DryRunCreator;
pub use executor::{ImportResult, TaskCreator};
pub use ingest::Spreadsheet;
pub use mapping::{FieldMapping, TaskField};
pub use session::ImportSession;
