//! Read/write the JSON batch report.
//!
//! The report lists every issue date a batch considered and what happened to
//! it, so a long run can be audited (or its skipped months retried) later.

use std::fs::File;
use std::path::Path;

use crate::error::{FamilyError, Result};
use crate::report::BatchReport;

pub fn write_report_json(path: &Path, report: &BatchReport) -> Result<()> {
    let file = File::create(path).map_err(|e| FamilyError::io(path, e))?;
    serde_json::to_writer_pretty(file, report).map_err(|e| FamilyError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn read_report_json(path: &Path) -> Result<BatchReport> {
    let file = File::open(path).map_err(|e| FamilyError::io(path, e))?;
    serde_json::from_reader(file).map_err(|e| FamilyError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
