//! CSV ingest for historical records and forecast files.
//!
//! Both file kinds share one shape: a date in the first column, then one
//! numeric column per variable (history) or per ensemble member (forecast).
//!
//! Design goals:
//! - **Strict rows**: a malformed forecast row is an error with its line number,
//!   never skipped (skipping would silently shift the forecast period)
//! - **Explicit gaps**: blank history cells become missing values that alignment
//!   reports if a forecast window needs them
//! - **Sorted index**: rows are ordered by date and duplicate dates are rejected

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Ensemble, HistoricalRecord};
use crate::error::{FamilyError, Result};

/// How blank value cells are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blanks {
    Missing,
    Reject,
}

/// Rows of a dated CSV, sorted by date.
#[derive(Debug, Clone)]
struct DatedTable {
    index: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

/// Load the historical record (`DD/MM/YYYY`, one column per variable).
pub fn read_history(path: &Path) -> Result<HistoricalRecord> {
    let file = File::open(path).map_err(|e| FamilyError::io(path, e))?;
    let table = read_dated_table(file, path, Blanks::Missing)?;
    HistoricalRecord::new(table.index, table.columns)
}

/// Load a forecast file issued on `issue_date`.
///
/// A file that does not exist is reported as `MissingForecast` so batch runs can
/// skip the date.
pub fn read_forecast(path: &Path, issue_date: NaiveDate) -> Result<Ensemble> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FamilyError::MissingForecast {
            issue_date,
            path: path.to_path_buf(),
        },
        _ => FamilyError::io(path, e),
    })?;
    forecast_from_reader(file, path)
}

/// Load a forecast file outside of any batch schedule.
pub fn read_forecast_file(path: &Path) -> Result<Ensemble> {
    let file = File::open(path).map_err(|e| FamilyError::io(path, e))?;
    forecast_from_reader(file, path)
}

fn forecast_from_reader<R: std::io::Read>(reader: R, path: &Path) -> Result<Ensemble> {
    let table = read_dated_table(reader, path, Blanks::Reject)?;
    Ensemble::new(table.index, table.columns)
}

fn read_dated_table<R: std::io::Read>(reader: R, path: &Path, blanks: Blanks) -> Result<DatedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(|e| FamilyError::csv(path, e))?.clone();
    let names = value_column_names(&headers, path)?;

    let mut rows: Vec<(usize, NaiveDate, Vec<f64>)> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| FamilyError::csv(path, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let (date, values) = parse_row(&record, names.len(), blanks)
            .map_err(|message| FamilyError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            })?;
        rows.push((line, date, values));
    }

    rows.sort_by_key(|(_, date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|w| w[0].1 == w[1].1) {
        return Err(FamilyError::Parse {
            path: path.to_path_buf(),
            line: pair[1].0,
            message: format!("duplicate date {} (also on line {})", pair[1].1, pair[0].0),
        });
    }

    let mut columns: Vec<(String, Vec<f64>)> = names
        .into_iter()
        .map(|name| (name, Vec::with_capacity(rows.len())))
        .collect();
    let mut index = Vec::with_capacity(rows.len());
    for (_, date, values) in rows {
        index.push(date);
        for ((_, column), v) in columns.iter_mut().zip(values) {
            column.push(v);
        }
    }

    Ok(DatedTable { index, columns })
}

fn value_column_names(headers: &StringRecord, path: &Path) -> Result<Vec<String>> {
    let names: Vec<String> = headers.iter().skip(1).map(normalize_header_name).collect();
    if names.is_empty() {
        return Err(FamilyError::csv(
            path,
            "expected a date column followed by at least one value column",
        ));
    }
    if let Some(blank) = names.iter().position(String::is_empty) {
        return Err(FamilyError::csv(path, format!("value column {} has no name", blank + 2)));
    }
    Ok(names)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes carry a UTF-8 BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_row(record: &StringRecord, width: usize, blanks: Blanks) -> std::result::Result<(NaiveDate, Vec<f64>), String> {
    if record.len() != width + 1 {
        return Err(format!("expected {} fields, found {}", width + 1, record.len()));
    }
    let date = parse_date(record.get(0).unwrap_or_default())?;

    let mut values = Vec::with_capacity(width);
    for (col, field) in record.iter().skip(1).enumerate() {
        let value = match (field.is_empty(), blanks) {
            (true, Blanks::Missing) => f64::NAN,
            (true, Blanks::Reject) => return Err(format!("missing value in column {}", col + 2)),
            (false, _) => field
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{field}' in column {}", col + 2))?,
        };
        values.push(value);
    }
    Ok((date, values))
}

/// Parse a calendar date in any of the accepted layouts.
///
/// Historical files use `DD/MM/YYYY`; forecast files use either that or
/// `YYYY/MM/DD`; ISO dates are accepted too. The layouts cannot be confused
/// because the year is the only four-digit field.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "invalid date '{s}'. Expected one of: DD/MM/YYYY, YYYY/MM/DD, YYYY-MM-DD, DD-MM-YYYY."
    ))
}
