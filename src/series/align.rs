//! Align a historical record with a forecast period.
//!
//! Only exact date matches are used: a forecast date without a historical value
//! is an error, never a gap to interpolate over or drop.

use chrono::NaiveDate;

use crate::domain::{TimeSeries, Variable, VariableKind};
use crate::error::{FamilyError, Result};

/// Select the historical values for `forecast_period`.
///
/// Flow variables are accumulated over the selected window so they are in the
/// same units as a cumulative forecast.
pub fn align(history: &TimeSeries, forecast_period: &[NaiveDate], variable: &Variable) -> Result<TimeSeries> {
    let index = history.index();
    let values = history.values();

    let mut selected = Vec::with_capacity(forecast_period.len());
    for &date in forecast_period {
        let missing = || FamilyError::MissingData {
            variable: variable.history_column.clone(),
            date,
        };
        let pos = index.binary_search(&date).map_err(|_| missing())?;
        let value = values[pos];
        if value.is_nan() {
            return Err(missing());
        }
        selected.push(value);
    }

    let aligned = TimeSeries::new(forecast_period.to_vec(), selected)?;
    Ok(match variable.kind {
        VariableKind::Flow => aligned.cumulative(),
        VariableKind::Level => aligned,
    })
}
