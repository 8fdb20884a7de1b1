//! Write forecast families to CSV.
//!
//! Every table has the same shape: a `Date` column (`YYYY-MM-DD`) followed by one
//! value column per skill (deterministic) or per member (ensemble). Values use
//! shortest round-trip formatting so files reload to the exact same doubles.

use std::fs::{File, create_dir_all};
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{DeterministicFamily, Ensemble, TimeSeries};
use crate::error::{FamilyError, Result};

/// One family table: column `S=<skill>` per member, in member order.
pub fn write_deterministic_family(path: &Path, family: &DeterministicFamily) -> Result<()> {
    let labels: Vec<String> = family.family.skills().map(|s| s.column_label()).collect();
    let columns: Vec<(&str, &[f64])> = labels
        .iter()
        .map(String::as_str)
        .zip(family.family.iter().map(|m| m.forecast.values()))
        .collect();
    write_table(path, family.forecast.index(), &columns)
}

/// The point forecast (ensemble mean) behind a deterministic family.
pub fn write_mean_forecast(path: &Path, variable: &str, forecast: &TimeSeries) -> Result<()> {
    let name = format!("Forecast {variable}: average");
    write_table(path, forecast.index(), &[(name.as_str(), forecast.values())])
}

/// One blended ensemble, same member columns as its source.
pub fn write_ensemble(path: &Path, ensemble: &Ensemble) -> Result<()> {
    let columns: Vec<(&str, &[f64])> = ensemble.members().collect();
    write_table(path, ensemble.index(), &columns)
}

fn write_table(path: &Path, index: &[NaiveDate], columns: &[(&str, &[f64])]) -> Result<()> {
    // Safe to race: several workers may create the same skill directory.
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| FamilyError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| FamilyError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("Date");
    header.extend(columns.iter().map(|(name, _)| *name));
    writer.write_record(&header).map_err(|e| FamilyError::csv(path, e))?;

    let mut row = Vec::with_capacity(columns.len() + 1);
    for (t, date) in index.iter().enumerate() {
        row.clear();
        row.push(date.format("%Y-%m-%d").to_string());
        row.extend(columns.iter().map(|(_, values)| format_value(values[t])));
        writer.write_record(&row).map_err(|e| FamilyError::csv(path, e))?;
    }

    writer.flush().map_err(|e| FamilyError::io(path, e))?;
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.is_nan() { String::new() } else { format!("{v}") }
}
