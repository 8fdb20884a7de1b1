//! Time-indexed containers.
//!
//! Both types own a strictly increasing daily index that is validated on
//! construction, so the generators can compare indices instead of trusting
//! positional alignment.

use chrono::NaiveDate;

use crate::error::{FamilyError, Result};

/// One value per timestamp: a historical record or a deterministic forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(index: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(FamilyError::Alignment(format!(
                "series has {} timestamps but {} values",
                index.len(),
                values.len()
            )));
        }
        ensure_increasing(&index)?;
        Ok(Self { index, values })
    }

    /// Build from an index that has already been validated elsewhere.
    pub(crate) fn from_validated(index: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self { index, values }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Running sum over the whole series.
    ///
    /// Turns daily increments (rainfall, evapotranspiration) into the cumulative
    /// totals that seasonal forecasts are issued in.
    pub fn cumulative(&self) -> TimeSeries {
        let values = self
            .values
            .iter()
            .scan(0.0, |acc, v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        Self::from_validated(self.index.clone(), values)
    }
}

/// A probabilistic forecast: named member columns over one shared index.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    index: Vec<NaiveDate>,
    names: Vec<String>,
    members: Vec<Vec<f64>>,
}

impl Ensemble {
    /// Build an ensemble from `(member name, values)` pairs.
    ///
    /// Requires at least one member, unique names, and one value per timestamp
    /// for every member.
    pub fn new(index: Vec<NaiveDate>, members: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if members.is_empty() {
            return Err(FamilyError::InvalidArgument(
                "an ensemble needs at least one member".to_string(),
            ));
        }
        ensure_increasing(&index)?;

        let mut names = Vec::with_capacity(members.len());
        let mut columns = Vec::with_capacity(members.len());
        for (name, values) in members {
            if values.len() != index.len() {
                return Err(FamilyError::Alignment(format!(
                    "member '{name}' has {} values for {} timestamps",
                    values.len(),
                    index.len()
                )));
            }
            if names.contains(&name) {
                return Err(FamilyError::InvalidArgument(format!(
                    "duplicate ensemble member '{name}'"
                )));
            }
            names.push(name);
            columns.push(values);
        }

        Ok(Self {
            index,
            names,
            members: columns,
        })
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn member_names(&self) -> &[String] {
        &self.names
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate `(name, values)` in column order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.members.iter().map(Vec::as_slice))
    }

    /// One member as a standalone series.
    pub fn member(&self, name: &str) -> Option<TimeSeries> {
        let pos = self.names.iter().position(|n| n == name)?;
        Some(TimeSeries::from_validated(
            self.index.clone(),
            self.members[pos].clone(),
        ))
    }

    /// Arithmetic mean across members at each timestamp.
    pub fn mean(&self) -> TimeSeries {
        let n = self.members.len() as f64;
        let values = (0..self.index.len())
            .map(|t| self.members.iter().map(|m| m[t]).sum::<f64>() / n)
            .collect();
        TimeSeries::from_validated(self.index.clone(), values)
    }

    /// Rebuild with the same index and member names, transforming each member.
    pub(crate) fn map_members<F>(&self, mut f: F) -> Ensemble
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let members = self.members.iter().map(|m| f(m)).collect();
        Ensemble {
            index: self.index.clone(),
            names: self.names.clone(),
            members,
        }
    }
}

/// Historical observations: one column per variable over a daily index.
///
/// Blank cells are held as `NaN` and reported as missing when a forecast window
/// needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    index: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

impl HistoricalRecord {
    pub fn new(index: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        ensure_increasing(&index)?;
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != index.len()) {
            return Err(FamilyError::Alignment(format!(
                "history column '{name}' has {} values for {} dates",
                values.len(),
                index.len()
            )));
        }
        Ok(Self { index, columns })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// The full record of one variable.
    pub fn series(&self, column: &str) -> Result<TimeSeries> {
        let (_, values) = self
            .columns
            .iter()
            .find(|(name, _)| name == column)
            .ok_or_else(|| {
                let available: Vec<&str> = self.column_names().collect();
                FamilyError::InvalidArgument(format!(
                    "history has no column '{column}' (available: {})",
                    available.join(", ")
                ))
            })?;
        Ok(TimeSeries::from_validated(self.index.clone(), values.clone()))
    }
}

fn ensure_increasing(index: &[NaiveDate]) -> Result<()> {
    for pair in index.windows(2) {
        if pair[1] <= pair[0] {
            return Err(FamilyError::InvalidArgument(format!(
                "timestamps must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(1969, 1, d).unwrap())
            .collect()
    }

    #[test]
    fn rejects_unsorted_index() {
        let mut index = days(3);
        index.swap(1, 2);
        let err = TimeSeries::new(index, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, FamilyError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new(days(3), vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, FamilyError::Alignment(_)));
    }

    #[test]
    fn cumulative_is_running_sum() {
        let s = TimeSeries::new(days(4), vec![2.0, 0.0, 1.5, 3.0]).unwrap();
        assert_eq!(s.cumulative().values(), &[2.0, 2.0, 3.5, 6.5]);
        assert_eq!(s.cumulative().index(), s.index());
    }

    #[test]
    fn ensemble_mean_is_member_average() {
        let e = Ensemble::new(
            days(3),
            vec![
                ("1".to_string(), vec![1.5, 0.5, -1.0]),
                ("2".to_string(), vec![2.0, 1.0, 3.0]),
                ("3".to_string(), vec![2.5, 0.0, 1.0]),
            ],
        )
        .unwrap();
        let mean = e.mean();
        assert!((mean.values()[0] - 2.0).abs() < 1e-12);
        assert!((mean.values()[1] - 0.5).abs() < 1e-12);
        assert!((mean.values()[2] - 1.0).abs() < 1e-12);
        assert_eq!(e.member("2").unwrap().values(), &[2.0, 1.0, 3.0]);
        assert!(e.member("4").is_none());
    }

    #[test]
    fn ensemble_rejects_duplicate_and_short_members() {
        let dup = Ensemble::new(
            days(2),
            vec![
                ("1".to_string(), vec![1.0, 2.0]),
                ("1".to_string(), vec![1.0, 2.0]),
            ],
        );
        assert!(matches!(dup, Err(FamilyError::InvalidArgument(_))));

        let short = Ensemble::new(days(2), vec![("1".to_string(), vec![1.0])]);
        assert!(matches!(short, Err(FamilyError::Alignment(_))));

        let empty = Ensemble::new(days(2), Vec::new());
        assert!(matches!(empty, Err(FamilyError::InvalidArgument(_))));
    }
}
