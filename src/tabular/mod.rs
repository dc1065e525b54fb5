//! Spreadsheet access for rosters and ledgers.
//!
//! Workbooks go through `calamine`, comma-separated files through `csv`.
//! Every cell is normalised to text up front so the loaders above only deal
//! with `Option<String>`.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabularError {
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unsupported tabular file: {0}")]
    UnsupportedFormat(String),

    #[error("Workbook has no worksheet: {0}")]
    NoWorksheet(String),

    #[error("Header row {row} not found in {path}")]
    MissingHeader { path: String, row: usize },
}

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// A sheet: one header row and the data rows below it
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Index of the column with this exact header
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell text, `None` when empty or past the end of a short row
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lowercased extension of a path
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Read the first worksheet (or the CSV body) with headers on `header_row`.
/// Rows above the header are ignored; fully empty rows are dropped.
pub fn read_table(path: &Path, header_row: usize) -> Result<Table, TabularError> {
    let raw = match extension_of(path).as_deref() {
        Some("csv") => read_csv_rows(path)?,
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => read_workbook_rows(path)?,
        _ => {
            return Err(TabularError::UnsupportedFormat(
                path.display().to_string(),
            ))
        }
    };

    let mut rows = raw.into_iter().skip(header_row);
    let headers = rows
        .next()
        .ok_or_else(|| TabularError::MissingHeader {
            path: path.display().to_string(),
            row: header_row,
        })?
        .into_iter()
        .map(|h| h.unwrap_or_default().trim_start_matches('\u{feff}').to_string())
        .collect();

    let rows = rows
        .filter(|row| row.iter().any(|cell| cell.is_some()))
        .collect();

    Ok(Table { headers, rows })
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<Option<String>>>, TabularError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(normalize_text).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<Option<String>>>, TabularError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TabularError::NoWorksheet(path.display().to_string()))??;

    // The range starts at the first used cell; pad so row indices stay absolute
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows: Vec<Vec<Option<String>>> = vec![Vec::new(); first_row];
    rows.extend(
        range
            .rows()
            .map(|row| row.iter().map(normalize_cell).collect::<Vec<_>>()),
    );
    Ok(rows)
}

fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Render a workbook cell as text
pub fn normalize_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => normalize_text(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Some(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Some(format_float(dt.as_f64())),
        },
        Data::DateTimeIso(s) => normalize_text(&s.replacen('T', " ", 1)),
        Data::DurationIso(s) => normalize_text(s),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
