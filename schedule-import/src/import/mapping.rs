//! Field mapping between task fields and spreadsheet columns
//!
//! `FieldMapping::suggest` proposes a mapping from header keywords; the
//! user can then override any field before importing.

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::value::{CellValue, SpreadsheetRow};

/// Semantic task fields a column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskField {
    Title,
    Description,
    Assignee,
    StartDate,
    EndDate,
    Status,
    Priority,
    ParentTask,
}

impl TaskField {
    pub const ALL: [TaskField; 8] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Assignee,
        TaskField::StartDate,
        TaskField::EndDate,
        TaskField::Status,
        TaskField::Priority,
        TaskField::ParentTask,
    ];

    /// Key used on the command line (`--map start_date=Inicio`)
    pub fn key(&self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Assignee => "assignee",
            TaskField::StartDate => "start_date",
            TaskField::EndDate => "end_date",
            TaskField::Status => "status",
            TaskField::Priority => "priority",
            TaskField::ParentTask => "parent_task",
        }
    }

    /// Get display label for UI
    pub fn label(&self) -> &'static str {
        match self {
            TaskField::Title => "Title / task name",
            TaskField::Description => "Description",
            TaskField::Assignee => "Assignee",
            TaskField::StartDate => "Start date",
            TaskField::EndDate => "End date / due",
            TaskField::Status => "Status",
            TaskField::Priority => "Priority",
            TaskField::ParentTask => "Parent task (for subtasks)",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, TaskField::Title)
    }
}

impl std::fmt::Display for TaskField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for TaskField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        TaskField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| {
                let valid: Vec<&str> = TaskField::ALL.iter().map(|f| f.key()).collect();
                anyhow::anyhow!("Unknown field '{}' (expected one of: {})", s, valid.join(", "))
            })
    }
}

/// Header keywords per field, evaluated in order.
///
/// Keywords are matched as substrings of the normalized header.
const FIELD_KEYWORDS: &[(TaskField, &[&str])] = &[
    (TaskField::Title, &["tarea", "nombre", "titulo", "actividad"]),
    (TaskField::Description, &["descripcion", "detalle"]),
    (TaskField::Assignee, &["responsable", "asignado", "encargado"]),
    (TaskField::StartDate, &["inicio", "start", "desde"]),
    (TaskField::EndDate, &["fin", "end", "vencimiento", "hasta", "termino"]),
    (TaskField::Status, &["estado", "status"]),
    (TaskField::Priority, &["prioridad", "priority", "urgencia"]),
    (TaskField::ParentTask, &["padre", "parent", "superior"]),
];

/// Lower-case a header and strip Spanish diacritics
fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Mapping from task fields to column headers; unmapped fields are absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    columns: BTreeMap<TaskField, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a mapping from column headers.
    ///
    /// For each header (in order) every field is checked; the first column
    /// matching a field wins and is never replaced by a later one.
    pub fn suggest(headers: &[String]) -> Self {
        let mut mapping = Self::new();

        for header in headers {
            let normalized = normalize_header(header);
            for (field, keywords) in FIELD_KEYWORDS {
                if mapping.columns.contains_key(field) {
                    continue;
                }
                if keywords.iter().any(|kw| normalized.contains(kw)) {
                    log::debug!("Auto-mapped {} <- '{}'", field, header);
                    mapping.columns.insert(*field, header.clone());
                }
            }
        }

        mapping
    }

    /// Column mapped to a field
    pub fn column(&self, field: TaskField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: TaskField, column: impl Into<String>) {
        self.columns.insert(field, column.into());
    }

    /// Reset a field to unmapped
    pub fn clear(&mut self, field: TaskField) {
        self.columns.remove(&field);
    }

    /// Import is allowed only once every required field is mapped
    pub fn is_ready(&self) -> bool {
        TaskField::ALL
            .iter()
            .filter(|field| field.is_required())
            .all(|field| self.columns.contains_key(field))
    }

    /// Mapped (field, column) pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (TaskField, &str)> {
        self.columns.iter().map(|(field, col)| (*field, col.as_str()))
    }

    /// Cell for a field in a row, or None if the field is unmapped or the
    /// row has no such column
    pub fn cell<'r>(&self, row: &'r SpreadsheetRow, field: TaskField) -> Option<&'r CellValue> {
        self.column(field)
            .filter(|column| row.contains(column))
            .map(|column| row.get(column))
    }

    /// Apply a `field=Column` override; the column must be one of `headers`.
    ///
    /// An empty column (`field=`) clears the field.
    pub fn apply_override(&mut self, entry: &str, headers: &[String]) -> Result<()> {
        let Some((field, column)) = entry.split_once('=') else {
            bail!("Invalid mapping '{}' (expected field=Column)", entry);
        };
        let field: TaskField = field.parse()?;
        let column = column.trim();

        if column.is_empty() {
            self.clear(field);
            return Ok(());
        }

        let Some(header) = headers.iter().find(|h| h.as_str() == column).or_else(|| {
            headers
                .iter()
                .find(|h| h.trim().eq_ignore_ascii_case(column))
        }) else {
            bail!(
                "Column '{}' not found (available: {})",
                column,
                headers.join(", ")
            );
        };

        self.set(field, header.clone());
        Ok(())
    }
}
