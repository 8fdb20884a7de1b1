//! Batch outcomes and terminal reporting.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{GenerationMode, Metric, SkillValue};

pub mod format;

pub use format::*;

/// What happened to one issue date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Generated { files: Vec<PathBuf> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateOutcome {
    pub issue_date: NaiveDate,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Summary of a batch run, in issue-date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub tool: String,
    pub mode: GenerationMode,
    pub variable: String,
    /// Empty for ensemble runs.
    pub metrics: Vec<Metric>,
    pub skills: Vec<SkillValue>,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub dates: Vec<DateOutcome>,
}

impl BatchReport {
    pub fn generated(&self) -> impl Iterator<Item = &DateOutcome> + '_ {
        self.dates
            .iter()
            .filter(|d| matches!(d.outcome, Outcome::Generated { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DateOutcome> + '_ {
        self.dates
            .iter()
            .filter(|d| matches!(d.outcome, Outcome::Skipped { .. }))
    }

    pub fn files_written(&self) -> usize {
        self.dates
            .iter()
            .map(|d| match &d.outcome {
                Outcome::Generated { files } => files.len(),
                Outcome::Skipped { .. } => 0,
            })
            .sum()
    }
}
