//! Interactive mapping review

use anyhow::Result;
use colored::*;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use super::output::{print_mapping, print_preview};
use crate::import::{ImportSession, TaskField};

/// What the user chose to do with the proposed mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Import,
    ChooseAnotherFile,
    Cancel,
}

/// Show the mapping and preview until the user imports, picks another file
/// or cancels. Field edits are applied to the session as they are made.
pub fn review_mapping(session: &mut ImportSession) -> Result<ReviewAction> {
    let theme = ColorfulTheme::default();

    loop {
        if let Some(sheet) = session.sheet() {
            println!();
            print_mapping(session.mapping());
            println!();
            print_preview(sheet, session.mapping());
            println!();
        }

        let rows = session.sheet().map(|s| s.row_count()).unwrap_or(0);
        let options = [
            format!("Import {} rows", rows),
            "Change a column".to_string(),
            "Choose another file".to_string(),
            "Cancel".to_string(),
        ];

        let choice = Select::with_theme(&theme)
            .with_prompt("Review the mapping")
            .default(0)
            .items(&options)
            .interact()?;

        match choice {
            0 => {
                if session.can_import() {
                    return Ok(ReviewAction::Import);
                }
                println!(
                    "{}",
                    "Map a column to the title field before importing.".yellow()
                );
            }
            1 => edit_field(session, &theme)?,
            2 => return Ok(ReviewAction::ChooseAnotherFile),
            _ => return Ok(ReviewAction::Cancel),
        }
    }
}

/// Ask for the path of another spreadsheet
pub fn prompt_file_path() -> Result<PathBuf> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Spreadsheet path (.xlsx, .xls, .csv)")
        .interact_text()?;
    Ok(PathBuf::from(path.trim()))
}

fn edit_field(session: &mut ImportSession, theme: &ColorfulTheme) -> Result<()> {
    let field_labels: Vec<String> = TaskField::ALL
        .iter()
        .map(|field| match session.mapping().column(*field) {
            Some(column) => format!("{} ({})", field.label(), column),
            None => format!("{} (unmapped)", field.label()),
        })
        .collect();

    let field_idx = Select::with_theme(theme)
        .with_prompt("Field")
        .default(0)
        .items(&field_labels)
        .interact()?;
    let field = TaskField::ALL[field_idx];

    let headers = session
        .sheet()
        .map(|s| s.headers.clone())
        .unwrap_or_default();

    let mut column_options = vec!["(unmapped)".to_string()];
    column_options.extend(headers.iter().cloned());

    let current = session
        .mapping()
        .column(field)
        .and_then(|col| headers.iter().position(|h| h == col))
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let column_idx = Select::with_theme(theme)
        .with_prompt(format!("Column for {}", field.label()))
        .default(current)
        .items(&column_options)
        .interact()?;

    match column_idx {
        0 => session.mapping_mut().clear(field),
        idx => session.mapping_mut().set(field, headers[idx - 1].clone()),
    }
    Ok(())
}
