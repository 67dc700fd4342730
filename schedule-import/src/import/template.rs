//! Import template workbook
//!
//! The first sheet carries one header per task field, named so that
//! `FieldMapping::suggest` maps every field. A second sheet lists the
//! accepted status and priority values.

use anyhow::{Context, Result};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::path::Path;

use crate::api::models::{TaskPriority, TaskStatus};

/// Column indices for the task sheet
mod cols {
    pub const TITLE: u16 = 0;
    pub const DESCRIPTION: u16 = 1;
    pub const ASSIGNEE: u16 = 2;
    pub const START_DATE: u16 = 3;
    pub const END_DATE: u16 = 4;
    pub const STATUS: u16 = 5;
    pub const PRIORITY: u16 = 6;
    pub const PARENT: u16 = 7;
}

const HEADERS: [(u16, &str, f64); 8] = [
    (cols::TITLE, "Tarea", 32.0),
    (cols::DESCRIPTION, "Descripción", 40.0),
    (cols::ASSIGNEE, "Responsable", 22.0),
    (cols::START_DATE, "Fecha inicio", 14.0),
    (cols::END_DATE, "Fecha fin", 14.0),
    (cols::STATUS, "Estado", 14.0),
    (cols::PRIORITY, "Prioridad", 12.0),
    (cols::PARENT, "Tarea padre", 32.0),
];

/// Build the template workbook, optionally with two example rows
pub fn build_template(with_example: bool) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let tasks = workbook.add_worksheet();
    tasks.set_name("Tareas")?;
    write_header(tasks)?;
    if with_example {
        write_example(tasks)?;
    }

    let values = workbook.add_worksheet();
    values.set_name("Valores")?;
    write_values(values)?;

    workbook
        .save_to_buffer()
        .context("Failed to build template workbook")
}

/// Write the template to `path`
pub fn write_template(path: &Path, with_example: bool) -> Result<()> {
    let bytes = build_template(with_example)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write template: {}", path.display()))?;
    log::info!("Wrote import template to {}", path.display());
    Ok(())
}

fn write_header(ws: &mut Worksheet) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, name, width) in HEADERS {
        ws.write_string_with_format(0, col, name, &bold)?;
        ws.set_column_width(col, width)?;
    }
    ws.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_example(ws: &mut Worksheet) -> Result<()> {
    let date = Format::new().set_num_format("dd/mm/yyyy");

    ws.write_string(1, cols::TITLE, "Obra gruesa")?;
    ws.write_string(1, cols::DESCRIPTION, "Estructura y muros")?;
    ws.write_datetime_with_format(1, cols::START_DATE, &ExcelDateTime::from_ymd(2025, 1, 6)?, &date)?;
    ws.write_datetime_with_format(1, cols::END_DATE, &ExcelDateTime::from_ymd(2025, 3, 28)?, &date)?;
    ws.write_string(1, cols::STATUS, "En progreso")?;
    ws.write_string(1, cols::PRIORITY, "Alta")?;

    ws.write_string(2, cols::TITLE, "Fundaciones")?;
    ws.write_datetime_with_format(2, cols::START_DATE, &ExcelDateTime::from_ymd(2025, 1, 6)?, &date)?;
    ws.write_datetime_with_format(2, cols::END_DATE, &ExcelDateTime::from_ymd(2025, 1, 31)?, &date)?;
    ws.write_string(2, cols::STATUS, "Pendiente")?;
    ws.write_string(2, cols::PRIORITY, "Media")?;
    ws.write_string(2, cols::PARENT, "Obra gruesa")?;
    Ok(())
}

fn write_values(ws: &mut Worksheet) -> Result<()> {
    let bold = Format::new().set_bold();
    ws.write_string_with_format(0, 0, "Estado", &bold)?;
    ws.write_string_with_format(0, 1, "Prioridad", &bold)?;

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        ws.write_string(i as u32 + 1, 0, status.wire_value())?;
    }
    for (i, priority) in TaskPriority::ALL.iter().enumerate() {
        ws.write_string(i as u32 + 1, 1, priority.wire_value())?;
    }
    ws.set_column_width(0, 16)?;
    ws.set_column_width(1, 12)?;
    Ok(())
}
