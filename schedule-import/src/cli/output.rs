//! Terminal rendering for mappings, previews and import summaries

use colored::*;

use crate::import::{FieldMapping, ImportResult, Spreadsheet, TaskField};

/// Rows shown in the preview
pub const PREVIEW_ROWS: usize = 3;
/// Maximum characters shown per preview cell
pub const PREVIEW_CELL_CHARS: usize = 30;

/// Cut a cell to `max` characters
pub fn truncate_cell(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

pub fn print_mapping(mapping: &FieldMapping) {
    println!("{}", "Column mapping".bold());
    let width = TaskField::ALL
        .iter()
        .map(|f| f.label().chars().count())
        .max()
        .unwrap_or(0);

    for field in TaskField::ALL {
        let label = pad(field.label(), width);
        let marker = if field.is_required() { "*" } else { " " };
        match mapping.column(field) {
            Some(column) => println!("  {}{} {} {}", label, marker.red(), "←".dimmed(), column.green()),
            None if field.is_required() => {
                println!("  {}{} {} {}", label, marker.red(), "←".dimmed(), "(unmapped)".red())
            }
            None => println!("  {}{} {} {}", label, marker, "←".dimmed(), "(unmapped)".dimmed()),
        }
    }
}

/// Preview rows of mapped fields, one line per field
pub fn preview_table(sheet: &Spreadsheet, mapping: &FieldMapping) -> Vec<Vec<String>> {
    let fields: Vec<TaskField> = mapping.iter().map(|(field, _)| field).collect();

    let mut table = vec![fields.iter().map(|f| f.label().to_string()).collect::<Vec<_>>()];
    for row in sheet.rows.iter().take(PREVIEW_ROWS) {
        table.push(
            fields
                .iter()
                .map(|field| {
                    let text = mapping
                        .cell(row, *field)
                        .and_then(|cell| cell.trimmed_text())
                        .unwrap_or_else(|| "-".to_string());
                    truncate_cell(&text, PREVIEW_CELL_CHARS)
                })
                .collect(),
        );
    }
    table
}

pub fn print_preview(sheet: &Spreadsheet, mapping: &FieldMapping) {
    let table = preview_table(sheet, mapping);
    let Some(header) = table.first() else {
        return;
    };
    if header.is_empty() {
        println!("{}", "No mapped fields to preview".dimmed());
        return;
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            table
                .iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    println!(
        "{}",
        format!("Preview (first {} rows)", PREVIEW_ROWS.min(sheet.row_count())).bold()
    );
    for (i, row) in table.iter().enumerate() {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join("  ");
        if i == 0 {
            println!("  {}", line.cyan());
        } else {
            println!("  {}", line);
        }
    }
}

pub fn print_summary(result: &ImportResult) {
    println!();
    if result.errors.is_empty() {
        println!(
            "{} {} tasks imported",
            "✓".bright_green(),
            result.succeeded.to_string().bold()
        );
        return;
    }

    println!(
        "{} {} tasks imported, {} errors",
        "!".bright_yellow(),
        result.succeeded.to_string().bold(),
        result.failed().to_string().red()
    );
    println!("{}", "Errors:".bold());
    for error in &result.errors {
        println!("  {}", error);
    }
}
