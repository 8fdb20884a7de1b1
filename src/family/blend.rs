//! Linear blend of observations and a forecast.
//!
//! ```text
//! blended[t] = (1 - w) * observed[t] + w * forecast[t]
//! ```
//!
//! `w` is not restricted to `[0, 1]`; values outside extrapolate past either end.

use chrono::NaiveDate;

use crate::domain::TimeSeries;
use crate::error::{FamilyError, Result};

/// Blend two series sharing the same index.
pub fn blend(observations: &TimeSeries, forecast: &TimeSeries, weight: f64) -> Result<TimeSeries> {
    ensure_aligned(observations.index(), forecast.index())?;
    Ok(TimeSeries::from_validated(
        forecast.index().to_vec(),
        blend_values(observations.values(), forecast.values(), weight),
    ))
}

/// Pointwise blend of two equally long slices.
pub(crate) fn blend_values(observed: &[f64], forecast: &[f64], weight: f64) -> Vec<f64> {
    debug_assert_eq!(observed.len(), forecast.len());
    observed
        .iter()
        .zip(forecast)
        .map(|(o, f)| (1.0 - weight) * o + weight * f)
        .collect()
}

/// Fail unless both indices have the same length and the same timestamps.
pub fn ensure_aligned(observed: &[NaiveDate], forecast: &[NaiveDate]) -> Result<()> {
    if observed.len() != forecast.len() {
        return Err(FamilyError::Alignment(format!(
            "observations cover {} timestamps, forecast covers {}",
            observed.len(),
            forecast.len()
        )));
    }
    if let Some((o, f)) = observed.iter().zip(forecast).find(|(o, f)| o != f) {
        return Err(FamilyError::Alignment(format!(
            "observation timestamp {o} does not match forecast timestamp {f}"
        )));
    }
    Ok(())
}
