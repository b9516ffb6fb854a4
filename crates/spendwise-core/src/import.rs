//! Table import for bulk expense upload
//!
//! Accepts CSV and spreadsheet files whose first row names the columns.
//! Only `title`, `amount` and `date` are read; other columns are ignored.

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::NewExpense;

/// Columns every import file must carry (after lowercasing)
pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "amount", "date"];

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    /// Excel (`.xls`, `.xlsx`, `.xlsm`) and OpenDocument (`.ods`) workbooks
    Spreadsheet,
}

impl ImportFormat {
    /// Detect the format from a file name's extension (case-insensitive)
    pub fn from_filename(name: &str) -> Result<Self> {
        let extension = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "xls" | "xlsx" | "xlsm" | "ods" => Ok(ImportFormat::Spreadsheet),
            _ => Err(Error::UnsupportedFileType(format!(
                "'{}' is not a CSV or Excel file",
                name
            ))),
        }
    }
}

/// Parse an uploaded file's bytes in the given format
pub fn parse_expenses(data: &[u8], format: ImportFormat) -> Result<Vec<NewExpense>> {
    match format {
        ImportFormat::Csv => parse_csv(data),
        ImportFormat::Spreadsheet => parse_spreadsheet(data),
    }
}

/// Parse CSV with a header row
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewExpense>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::locate(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    columns.extract(rows)
}

/// Parse the first worksheet of a workbook
pub fn parse_spreadsheet(data: &[u8]) -> Result<Vec<NewExpense>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidImportSchema("Workbook has no sheets".into()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let columns = ColumnMap::locate(&headers)?;

    columns.extract(rows.map(|row| row.iter().map(cell_text).collect()).collect())
}

/// Render a spreadsheet cell as text; date cells become `YYYY-MM-DD`
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        Data::DateTimeIso(s) => s.get(..10).unwrap_or(s).to_string(),
        other => other.to_string(),
    }
}

/// Positions of the required columns within a row
#[derive(Debug)]
struct ColumnMap {
    title: usize,
    amount: usize,
    date: usize,
}

impl ColumnMap {
    fn locate(headers: &[String]) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();

        match (find("title"), find("amount"), find("date")) {
            (Some(title), Some(amount), Some(date)) => Ok(Self {
                title,
                amount,
                date,
            }),
            _ => Err(Error::InvalidImportSchema(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            ))),
        }
    }

    fn extract(&self, rows: Vec<Vec<String>>) -> Result<Vec<NewExpense>> {
        let mut expenses = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
            let amount = parse_amount(cell(self.amount), row_number)?;

            expenses.push(NewExpense::new(cell(self.title), amount, cell(self.date)));
        }

        debug!(rows = expenses.len(), "Parsed import table");
        Ok(expenses)
    }
}

fn parse_amount(raw: &str, row_number: usize) -> Result<f64> {
    if raw.is_empty() {
        return Err(Error::InvalidData(format!(
            "Row {}: amount is missing",
            row_number
        )));
    }

    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::InvalidData(format!(
            "Row {}: invalid amount '{}'",
            row_number, raw
        ))),
    }
}
