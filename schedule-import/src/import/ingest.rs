//! Spreadsheet ingestion
//!
//! Reads the first sheet of an xlsx/xls workbook (via calamine) or a CSV file
//! into header-keyed rows. The first row is always the header.

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Sheets, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;

use super::value::{CellValue, SpreadsheetRow};

/// Name given to header cells left blank
const EMPTY_HEADER: &str = "__EMPTY";

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(SpreadsheetFormat::Xlsx),
            "xls" => Ok(SpreadsheetFormat::Xls),
            "csv" => Ok(SpreadsheetFormat::Csv),
            _ => bail!(
                "Unsupported file type '{}' (expected .xlsx, .xls or .csv): {}",
                ext,
                path.display()
            ),
        }
    }
}

impl std::fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetFormat::Xlsx => write!(f, "xlsx"),
            SpreadsheetFormat::Xls => write!(f, "xls"),
            SpreadsheetFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parsed sheet: ordered headers plus one row per data line
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub headers: Vec<String>,
    pub rows: Vec<SpreadsheetRow>,
}

impl Spreadsheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read a spreadsheet file from disk
pub fn read_spreadsheet(path: &Path) -> Result<Spreadsheet> {
    let format = SpreadsheetFormat::from_path(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    log::info!("Reading {} ({} bytes, {})", path.display(), bytes.len(), format);
    parse_spreadsheet(bytes, format).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse spreadsheet bytes in the given format.
///
/// Fails when the sheet has no data rows after the header.
pub fn parse_spreadsheet(bytes: Vec<u8>, format: SpreadsheetFormat) -> Result<Spreadsheet> {
    let grid = match format {
        SpreadsheetFormat::Xlsx => {
            let workbook = Xlsx::new(Cursor::new(bytes)).context("Failed to open xlsx workbook")?;
            read_first_sheet(Sheets::Xlsx(workbook))?
        }
        SpreadsheetFormat::Xls => {
            let workbook = Xls::new(Cursor::new(bytes)).context("Failed to open xls workbook")?;
            read_first_sheet(Sheets::Xls(workbook))?
        }
        SpreadsheetFormat::Csv => read_csv_grid(&bytes)?,
    };

    build_spreadsheet(grid)
}

/// Raw cells of a sheet, starting at 1-based sheet row `first_row`.
///
/// Lines are contiguous: line `i` sits on sheet row `first_row + i`.
#[derive(Debug)]
struct SheetGrid {
    first_row: usize,
    lines: Vec<Vec<CellValue>>,
}

/// Read the first worksheet into a grid of cells
fn read_first_sheet(mut workbook: Sheets<Cursor<Vec<u8>>>) -> Result<SheetGrid> {
    if let Some(name) = workbook.sheet_names().first() {
        log::debug!("Using first sheet '{}'", name);
    }

    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook has no worksheets")?
        .context("Failed to read first worksheet")?;

    // The range begins at the first used cell, not at A1
    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);

    Ok(SheetGrid {
        first_row,
        lines: range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect(),
    })
}

/// Convert a calamine cell to a cell value
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read CSV bytes into a grid of cells.
///
/// The csv reader drops blank lines; they are put back as empty lines so
/// every record keeps its sheet row.
fn read_csv_grid(bytes: &[u8]) -> Result<SheetGrid> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let delimiter = sniff_delimiter(bytes);
    log::debug!("CSV delimiter: '{}'", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut grid = SheetGrid {
        first_row: 1,
        lines: Vec::new(),
    };
    for (i, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", i + 1))?;

        let offset = record.position().map_or(0, |pos| pos.byte() as usize);
        let breaks = line_breaks_around(bytes, offset);
        if i == 0 {
            grid.first_row += breaks;
        } else {
            // One break ends the previous record, the rest are blank lines
            for _ in 1..breaks {
                grid.lines.push(Vec::new());
            }
        }

        let cells = record
            .iter()
            .map(|field| csv_cell(&String::from_utf8_lossy(field)))
            .collect();
        grid.lines.push(cells);
    }

    Ok(grid)
}

/// Count the line breaks in the run of `\r`/`\n` bytes touching `offset`.
/// `\r\n` counts as one break.
fn line_breaks_around(bytes: &[u8], offset: usize) -> usize {
    let is_eol = |b: &u8| *b == b'\r' || *b == b'\n';
    let offset = offset.min(bytes.len());
    let start = bytes[..offset]
        .iter()
        .rposition(|b| !is_eol(b))
        .map_or(0, |i| i + 1);
    let end = bytes[offset..]
        .iter()
        .position(|b| !is_eol(b))
        .map_or(bytes.len(), |i| offset + i);

    let run = &bytes[start..end];
    let mut breaks = 0;
    let mut i = 0;
    while i < run.len() {
        i += if run[i] == b'\r' && run.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
        breaks += 1;
    }
    breaks
}

/// Pick `;` when the header line has more semicolons than commas
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// CSV cells stay text as written (`1.10`, `007`); only date coercion
/// reads a number out of them.
fn csv_cell(field: &str) -> CellValue {
    if field.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}

fn is_empty_line(cells: &[CellValue]) -> bool {
    cells.iter().all(|cell| matches!(cell, CellValue::Empty))
}

/// Turn a raw grid into headers and rows tagged with their sheet row.
///
/// Leading empty lines are skipped; the first non-empty line is the header.
fn build_spreadsheet(grid: SheetGrid) -> Result<Spreadsheet> {
    let mut header_row = grid.first_row;
    let mut lines = grid.lines.into_iter().peekable();
    while lines.next_if(|cells| is_empty_line(cells)).is_some() {
        header_row += 1;
    }

    let header_cells = lines.next().unwrap_or_default();
    let data: Vec<Vec<CellValue>> = lines.collect();

    if data.is_empty() {
        bail!("Spreadsheet has no data rows after the header");
    }

    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header_cells.len()))
        .max()
        .unwrap_or(0);

    let mut raw_headers: Vec<String> = header_cells
        .iter()
        .map(|cell| cell.to_text().trim().to_string())
        .collect();
    raw_headers.resize(width, String::new());
    let headers = unique_headers(raw_headers);

    let rows: Vec<SpreadsheetRow> = data
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            SpreadsheetRow::from_cells(&headers, cells).at_sheet_row(header_row + 1 + i)
        })
        .collect();

    log::info!(
        "Parsed {} columns and {} data rows (header on row {})",
        headers.len(),
        rows.len(),
        header_row
    );
    Ok(Spreadsheet { headers, rows })
}

/// Name blank headers `__EMPTY`, `__EMPTY_1`, ... and suffix repeated ones
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(raw.len());

    for header in raw {
        let base = if header.is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            header
        };

        let mut name = base.clone();
        while used.contains(&name) {
            let suffix = suffixes.entry(base.clone()).or_insert(0);
            *suffix += 1;
            name = format!("{}_{}", base, suffix);
        }
        used.insert(name.clone());
        headers.push(name);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn xlsx_fixture() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");

        sheet.write_string(0, 0, "Tarea").unwrap();
        sheet.write_string(0, 1, "Fecha inicio").unwrap();
        sheet.write_string(0, 2, "Horas").unwrap();
        sheet.write_string(0, 3, "Tarea padre").unwrap();

        sheet.write_string(1, 0, "Diseño").unwrap();
        let date = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        sheet.write_number(1, 2, 12.5).unwrap();

        // Second data row only fills the first and last columns
        sheet.write_string(2, 0, "Planos").unwrap();
        sheet.write_string(2, 3, "Diseño").unwrap();

        // A second sheet must be ignored
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "Ignorada").unwrap();
        other.write_string(1, 0, "x").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("plan.XLSX")).unwrap(),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("plan.xls")).unwrap(),
            SpreadsheetFormat::Xls
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("plan.csv")).unwrap(),
            SpreadsheetFormat::Csv
        );
        assert!(SpreadsheetFormat::from_path(Path::new("plan.pdf")).is_err());
        assert!(SpreadsheetFormat::from_path(Path::new("plan")).is_err());
    }

    #[test]
    fn test_xlsx_first_sheet_with_padding() {
        let sheet = parse_spreadsheet(xlsx_fixture(), SpreadsheetFormat::Xlsx).unwrap();

        assert_eq!(sheet.headers, vec!["Tarea", "Fecha inicio", "Horas", "Tarea padre"]);
        assert_eq!(sheet.row_count(), 2);

        let first = &sheet.rows[0];
        assert_eq!(first.get("Tarea"), &CellValue::Text("Diseño".into()));
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(first.get("Fecha inicio"), &CellValue::Date(expected));
        assert_eq!(first.get("Horas"), &CellValue::Number(12.5));
        assert_eq!(first.get("Tarea padre"), &CellValue::Empty);

        let second = &sheet.rows[1];
        for header in &sheet.headers {
            assert!(second.contains(header));
        }
        assert_eq!(second.get("Fecha inicio"), &CellValue::Empty);
        assert_eq!(second.get("Tarea padre"), &CellValue::Text("Diseño".into()));
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Tarea").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = parse_spreadsheet(bytes, SpreadsheetFormat::Xlsx).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_corrupt_workbook_fails() {
        let result = parse_spreadsheet(b"not a zip".to_vec(), SpreadsheetFormat::Xlsx);
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_rows_and_types() {
        let csv = "\u{feff}Tarea,Inicio,Estado\nA,05/03/2024,Terminado\nB,45356\n\nC,,  \n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        assert_eq!(sheet.headers, vec!["Tarea", "Inicio", "Estado"]);
        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.rows[0].get("Inicio"), &CellValue::Text("05/03/2024".into()));
        assert_eq!(sheet.rows[1].get("Inicio"), &CellValue::Text("45356".into()));
        assert_eq!(sheet.rows[1].get("Estado"), &CellValue::Empty);
        assert_eq!(sheet.rows[2].get("Tarea"), &CellValue::Empty);
        assert_eq!(sheet.rows[3].get("Tarea"), &CellValue::Text("C".into()));
        assert_eq!(sheet.rows[3].get("Estado"), &CellValue::Empty);
    }

    #[test]
    fn test_csv_blank_lines_keep_sheet_rows() {
        let csv = "\r\nTarea\r\nA\r\n\r\n\r\nB\r\n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        let numbers: Vec<Option<usize>> = sheet.rows.iter().map(|r| r.sheet_row()).collect();
        assert_eq!(numbers, vec![Some(3), Some(4), Some(5), Some(6)]);
        assert_eq!(sheet.rows[3].get("Tarea"), &CellValue::Text("B".into()));
    }

    #[test]
    fn test_csv_quoted_newline_is_one_row() {
        let csv = "Tarea,Notas\nA,\"linea 1\nlinea 2\"\nB,x\n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.rows[0].get("Notas"), &CellValue::Text("linea 1\nlinea 2".into()));
        assert_eq!(sheet.rows[1].sheet_row(), Some(3));
    }

    #[test]
    fn test_csv_numeric_text_is_kept_verbatim() {
        let csv = "Tarea,Horas\n1.10,007\n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        assert_eq!(sheet.rows[0].get("Tarea"), &CellValue::Text("1.10".into()));
        assert_eq!(sheet.rows[0].get("Horas").to_text(), "007");
    }

    #[test]
    fn test_xlsx_header_below_first_row() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(1, 0, "Tarea").unwrap();
        sheet.write_string(2, 0, "A").unwrap();
        sheet.write_string(4, 0, "B").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = parse_spreadsheet(bytes, SpreadsheetFormat::Xlsx).unwrap();
        assert_eq!(sheet.headers, vec!["Tarea"]);
        let numbers: Vec<Option<usize>> = sheet.rows.iter().map(|r| r.sheet_row()).collect();
        assert_eq!(numbers, vec![Some(3), Some(4), Some(5)]);
        assert_eq!(sheet.rows[2].get("Tarea"), &CellValue::Text("B".into()));
    }

    #[test]
    fn test_line_breaks_around() {
        assert_eq!(line_breaks_around(b"A\nB", 2), 1);
        assert_eq!(line_breaks_around(b"A\r\n\r\nB", 2), 2);
        assert_eq!(line_breaks_around(b"A\r\rB", 2), 2);
        assert_eq!(line_breaks_around(b"\n\nA", 0), 2);
        assert_eq!(line_breaks_around(b"A", 0), 0);
    }

    #[test]
    fn test_csv_semicolon_delimiter() {
        let csv = "Tarea;Responsable\nRevisión, final;Ana\n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        assert_eq!(sheet.headers, vec!["Tarea", "Responsable"]);
        assert_eq!(sheet.rows[0].get("Tarea"), &CellValue::Text("Revisión, final".into()));
    }

    #[test]
    fn test_csv_header_only_is_empty() {
        let result = parse_spreadsheet(b"Tarea,Estado\n".to_vec(), SpreadsheetFormat::Csv);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let headers = unique_headers(vec![
            "Tarea".into(),
            String::new(),
            "Tarea".into(),
            String::new(),
            "Tarea".into(),
        ]);
        assert_eq!(headers, vec!["Tarea", "__EMPTY", "Tarea_1", "__EMPTY_1", "Tarea_2"]);
    }

    #[test]
    fn test_extra_cells_get_generated_headers() {
        let csv = "Tarea\nA,sobrante\n";
        let sheet = parse_spreadsheet(csv.as_bytes().to_vec(), SpreadsheetFormat::Csv).unwrap();

        assert_eq!(sheet.headers, vec!["Tarea", "__EMPTY"]);
        assert_eq!(sheet.rows[0].get("__EMPTY"), &CellValue::Text("sobrante".into()));
    }
}
