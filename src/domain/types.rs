//! Shared domain types.
//!
//! Kept small and serializable so they can be carried from the CLI into the
//! pipeline and out again into the JSON run report.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::series::{Ensemble, TimeSeries};
use crate::error::FamilyError;

/// Error metric a deterministic skill score is based on.
///
/// Selects how a skill value becomes a blend weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    /// Mean absolute error: `weight = 1 - skill`.
    Mae,
    /// Mean squared error: `weight = sqrt(1 - skill)`.
    Mse,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Mae => "MAE",
            Metric::Mse => "MSE",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = FamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAE" => Ok(Metric::Mae),
            "MSE" => Ok(Metric::Mse),
            _ => Err(FamilyError::InvalidArgument(format!(
                "metric must be 'MAE' or 'MSE', got '{s}'"
            ))),
        }
    }
}

/// Whether a variable is an incremental flow or a level.
///
/// Flow observations are accumulated over the forecast window before blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Precipitation, evapotranspiration and similar per-day totals.
    Flow,
    /// Temperature and other instantaneous quantities.
    Level,
}

impl VariableKind {
    /// Historical column names known to hold flow quantities.
    pub const FLOW_COLUMNS: [&'static str; 2] = ["Rain", "PET"];

    pub fn for_column(column: &str) -> Self {
        if Self::FLOW_COLUMNS.contains(&column) {
            VariableKind::Flow
        } else {
            VariableKind::Level
        }
    }
}

/// CLI-facing variable kind. `Auto` resolves from the historical column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindChoice {
    Auto,
    Flow,
    Level,
}

impl KindChoice {
    pub fn resolve(self, history_column: &str) -> VariableKind {
        match self {
            KindChoice::Auto => VariableKind::for_column(history_column),
            KindChoice::Flow => VariableKind::Flow,
            KindChoice::Level => VariableKind::Level,
        }
    }
}

/// A requested skill level.
///
/// Conventionally in `[0, 1]` but never clamped. Only non-finite values are refused.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillValue(f64);

impl SkillValue {
    pub fn new(value: f64) -> Result<Self, FamilyError> {
        if !value.is_finite() {
            return Err(FamilyError::InvalidArgument(format!(
                "skill value must be finite, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Column header used in deterministic family tables, e.g. `S=0.5`.
    pub fn column_label(self) -> String {
        format!("S={}", format_skill(self.0))
    }

    /// Label used for ensemble family directories, e.g. `CRPSS=0.50`.
    ///
    /// Rounded to two decimals, so nearby skills can share a label.
    pub fn ensemble_label(self) -> String {
        format!("CRPSS={:.2}", self.0)
    }
}

impl fmt::Display for SkillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_skill(self.0))
    }
}

impl FromStr for SkillValue {
    type Err = FamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|e| FamilyError::InvalidArgument(format!("invalid skill '{s}': {e}")))?;
        Self::new(value)
    }
}

/// Shortest round-trip formatting, keeping a trailing `.0` on integral values.
fn format_skill(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// `n` evenly spaced skills from `start` to `end`, both inclusive.
///
/// Each point is computed as `start + (end - start) * i / (n - 1)` so that grid
/// points such as `0.3` come out as the nearest double rather than an
/// accumulated sum.
pub fn skill_grid(start: f64, end: f64, n: usize) -> Result<Vec<SkillValue>, FamilyError> {
    if !(start.is_finite() && end.is_finite()) {
        return Err(FamilyError::InvalidArgument(format!(
            "invalid skill range: {start}..{end}"
        )));
    }
    match n {
        0 => Err(FamilyError::InvalidArgument(
            "skill grid needs at least one point".to_string(),
        )),
        1 => Ok(vec![SkillValue(start)]),
        _ => {
            let last = (n - 1) as f64;
            Ok((0..n)
                .map(|i| {
                    if i == n - 1 {
                        SkillValue(end)
                    } else {
                        SkillValue(start + (end - start) * (i as f64 / last))
                    }
                })
                .collect())
        }
    }
}

/// One member of a forecast family: the skill it was generated for and its forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyMember<T> {
    pub skill: SkillValue,
    pub forecast: T,
}

/// Forecasts at requested skill levels, in the order the skills were requested.
///
/// Duplicate skills are kept as separate members. Every member shares the index
/// of the forecast it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFamily<T> {
    members: Vec<FamilyMember<T>>,
}

impl<T> ForecastFamily<T> {
    pub(crate) fn from_members(members: Vec<FamilyMember<T>>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[FamilyMember<T>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn skills(&self) -> impl Iterator<Item = SkillValue> + '_ {
        self.members.iter().map(|m| m.skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FamilyMember<T>> + '_ {
        self.members.iter()
    }
}

impl<T> IntoIterator for ForecastFamily<T> {
    type Item = FamilyMember<T>;
    type IntoIter = std::vec::IntoIter<FamilyMember<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

/// Deterministic output: the point forecast that was blended plus the family.
///
/// When the input was an ensemble, `forecast` is the member mean.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicFamily {
    pub metric: Metric,
    pub forecast: TimeSeries,
    pub family: ForecastFamily<TimeSeries>,
}

pub type EnsembleFamily = ForecastFamily<Ensemble>;

/// Which family a batch run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Deterministic,
    Ensemble,
}

/// The forecast variable, named as it appears in history and in forecast files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub history_column: String,
    pub forecast_name: String,
    pub kind: VariableKind,
}

/// A full batch configuration as understood by the pipeline.
///
/// Derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct FamilyConfig {
    pub history_file: PathBuf,
    pub forecast_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Fixed tag between the issue date and the variable in file names.
    pub file_tag: String,
    pub variable: Variable,
    pub mode: GenerationMode,
    pub skills: Vec<SkillValue>,
    /// Deterministic runs produce one family file per metric.
    pub metrics: Vec<Metric>,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub parallel: bool,
    /// Also persist the ensemble-mean forecast next to deterministic families.
    pub write_mean: bool,
    pub report: Option<PathBuf>,
}
