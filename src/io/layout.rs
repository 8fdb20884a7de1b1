//! File naming for forecast inputs and family outputs.
//!
//! The generators never build paths themselves; the pipeline asks a
//! [`FamilyLayout`] where each artifact lives, so storage conventions can be
//! swapped without touching the core.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{FamilyConfig, Metric, SkillValue};

/// Maps (issue date, variable, metric or skill) to a path.
pub trait FamilyLayout: Send + Sync {
    /// Where the forecast issued on `issue` is read from.
    fn forecast_path(&self, issue: NaiveDate, variable: &str) -> PathBuf;

    /// One table per (issue date, variable, metric), one column per skill.
    fn deterministic_path(&self, issue: NaiveDate, variable: &str, metric: Metric) -> PathBuf;

    /// The ensemble-mean forecast blended by the deterministic families.
    fn mean_path(&self, issue: NaiveDate, variable: &str) -> PathBuf;

    /// One ensemble per (issue date, variable, skill).
    fn ensemble_path(&self, issue: NaiveDate, variable: &str, skill: SkillValue) -> PathBuf;
}

/// `<YYYYMMDD><tag><variable>` naming, ensembles grouped in one directory per skill.
///
/// With the default tag:
///
/// ```text
/// <forecast_dir>/19690101_1d_7m_ECMWF_Temp.csv
/// <output_dir>/19690101_1d_7m_ECMWF_Temp_MAE_Family.csv
/// <output_dir>/19690101_1d_7m_ECMWF_Temp_Mean.csv
/// <output_dir>/ECMWF_Ensemble_skill_CRPSS=0.50/19690101_1d_7m_ECMWF_Temp.csv
/// ```
#[derive(Debug, Clone)]
pub struct TaggedLayout {
    forecast_dir: PathBuf,
    output_dir: PathBuf,
    tag: String,
    skill_dir_prefix: String,
}

impl TaggedLayout {
    pub const DEFAULT_TAG: &'static str = "_1d_7m_ECMWF_";
    pub const DEFAULT_SKILL_DIR_PREFIX: &'static str = "ECMWF_Ensemble_skill_";

    pub fn new(forecast_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            forecast_dir: forecast_dir.into(),
            output_dir: output_dir.into(),
            tag: tag.into(),
            skill_dir_prefix: Self::DEFAULT_SKILL_DIR_PREFIX.to_string(),
        }
    }

    pub fn from_config(config: &FamilyConfig) -> Self {
        Self::new(&config.forecast_dir, &config.output_dir, config.file_tag.as_str())
    }

    pub fn with_skill_dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.skill_dir_prefix = prefix.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn stem(&self, issue: NaiveDate, variable: &str) -> String {
        format!("{}{}{}", issue.format("%Y%m%d"), self.tag, variable)
    }
}

impl FamilyLayout for TaggedLayout {
    fn forecast_path(&self, issue: NaiveDate, variable: &str) -> PathBuf {
        self.forecast_dir.join(format!("{}.csv", self.stem(issue, variable)))
    }

    fn deterministic_path(&self, issue: NaiveDate, variable: &str, metric: Metric) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_Family.csv", self.stem(issue, variable), metric.as_str()))
    }

    fn mean_path(&self, issue: NaiveDate, variable: &str) -> PathBuf {
        self.output_dir.join(format!("{}_Mean.csv", self.stem(issue, variable)))
    }

    fn ensemble_path(&self, issue: NaiveDate, variable: &str, skill: SkillValue) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.skill_dir_prefix, skill.ensemble_label()))
            .join(format!("{}.csv", self.stem(issue, variable)))
    }
}
