//! Spreadsheet cell values and rows

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing or empty cell
    #[default]
    Empty,
    /// Free text
    Text(String),
    /// Native numeric cell (may also be an Excel serial date)
    Number(f64),
    /// Native date/time cell
    Date(NaiveDateTime),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    /// Render the cell as text, the way it would be shown in a sheet
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Whole numbers render without a decimal part
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.date().format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Trimmed text, or None if blank
    pub fn trimmed_text(&self) -> Option<String> {
        let text = self.to_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// One data row, keyed by column header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadsheetRow {
    cells: HashMap<String, CellValue>,
    /// 1-based row in the source sheet, when read from a file
    sheet_row: Option<usize>,
}

impl SpreadsheetRow {
    /// Build a row from parallel header and cell lists.
    ///
    /// Headers without a matching cell get `CellValue::Empty`.
    pub fn from_cells(headers: &[String], cells: Vec<CellValue>) -> Self {
        let mut cells = cells.into_iter();
        let cells = headers
            .iter()
            .map(|header| (header.clone(), cells.next().unwrap_or_default()))
            .collect();
        Self {
            cells,
            sheet_row: None,
        }
    }

    /// Tag the row with the sheet row it was read from
    pub fn at_sheet_row(mut self, row: usize) -> Self {
        self.sheet_row = Some(row);
        self
    }

    pub fn sheet_row(&self) -> Option<usize> {
        self.sheet_row
    }

    /// Get a cell by header; unknown headers read as empty
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells.get(header).unwrap_or(&EMPTY)
    }

    /// Check whether the row has a key for this header
    pub fn contains(&self, header: &str) -> bool {
        self.cells.contains_key(header)
    }
}
