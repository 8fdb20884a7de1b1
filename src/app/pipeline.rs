//! Shared batch logic used by the `deterministic` and `ensemble` commands.
//!
//! Per issue date: forecast file -> history alignment -> family -> CSV files.
//! Dates are independent of each other, so a batch can run them on the rayon
//! pool; outcomes are always reported in date order.
//!
//! A missing forecast file skips its date. Any other error ends the batch: a
//! sequential run stops before touching later dates, while a parallel run may
//! already have written them.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{FamilyConfig, GenerationMode, Metric, TimeSeries};
use crate::error::{AppError, FamilyError};
use crate::family::{deterministic_family_from_ensemble, ensemble_family};
use crate::io::{FamilyLayout, export, ingest};
use crate::report::{BatchReport, DateOutcome, Outcome};
use crate::schedule::MonthlySchedule;
use crate::series::align;

/// An error from one issue date, with the metric it happened under (if any).
#[derive(Debug)]
struct StepError {
    error: FamilyError,
    metric: Option<Metric>,
}

impl StepError {
    fn for_metric(error: FamilyError, metric: Metric) -> Self {
        Self {
            error,
            metric: Some(metric),
        }
    }
}

impl From<FamilyError> for StepError {
    fn from(error: FamilyError) -> Self {
        Self { error, metric: None }
    }
}

/// Run a batch over every scheduled issue date.
pub fn run_batch(config: &FamilyConfig, layout: &dyn FamilyLayout) -> Result<BatchReport, AppError> {
    let history = ingest::read_history(&config.history_file)
        .and_then(|record| record.series(&config.variable.history_column))
        .map_err(|e| AppError::with_context(&e, "Failed to load history"))?;

    let schedule = MonthlySchedule::new(config.begin, config.end);
    let dates: Vec<NaiveDate> = schedule.iter().collect();
    info!(
        dates = dates.len(),
        variable = %config.variable.forecast_name,
        mode = ?config.mode,
        "starting batch"
    );

    let mut outcomes = Vec::with_capacity(dates.len());
    if config.parallel {
        // Every date runs to completion before outcomes are inspected.
        let results: Vec<(NaiveDate, Result<Vec<PathBuf>, StepError>)> = dates
            .par_iter()
            .map(|&issue| (issue, generate_for_date(config, layout, &history, issue)))
            .collect();
        for (issue, result) in results {
            outcomes.push(record_outcome(config, issue, result)?);
        }
    } else {
        for &issue in &dates {
            let result = generate_for_date(config, layout, &history, issue);
            outcomes.push(record_outcome(config, issue, result)?);
        }
    }

    Ok(BatchReport {
        tool: "ffam".to_string(),
        mode: config.mode,
        variable: config.variable.forecast_name.clone(),
        metrics: match config.mode {
            GenerationMode::Deterministic => config.metrics.clone(),
            GenerationMode::Ensemble => Vec::new(),
        },
        skills: config.skills.clone(),
        begin: config.begin,
        end: config.end,
        dates: outcomes,
    })
}

/// Turn one date's result into its report entry, or the error that ends the batch.
fn record_outcome(
    config: &FamilyConfig,
    issue: NaiveDate,
    result: Result<Vec<PathBuf>, StepError>,
) -> Result<DateOutcome, AppError> {
    let outcome = match result {
        Ok(files) => {
            info!(issue = %issue, files = files.len(), "generated family");
            Outcome::Generated { files }
        }
        Err(step) if step.error.is_recoverable() => {
            warn!(issue = %issue, "skipping: {}", step.error);
            Outcome::Skipped {
                reason: step.error.to_string(),
            }
        }
        Err(step) => {
            let context = match step.metric {
                Some(metric) => format!(
                    "Issue date {issue}, variable '{}', metric {metric}",
                    config.variable.forecast_name
                ),
                None => format!(
                    "Issue date {issue}, variable '{}'",
                    config.variable.forecast_name
                ),
            };
            return Err(AppError::with_context(&step.error, context));
        }
    };
    Ok(DateOutcome {
        issue_date: issue,
        outcome,
    })
}

/// Generate and persist every family artifact for one issue date.
///
/// All families are built and all output paths planned before the first file
/// is written, so a failing date leaves nothing behind unless a write fails.
fn generate_for_date(
    config: &FamilyConfig,
    layout: &dyn FamilyLayout,
    history: &TimeSeries,
    issue: NaiveDate,
) -> Result<Vec<PathBuf>, StepError> {
    let variable = &config.variable;
    let forecast_path = layout.forecast_path(issue, &variable.forecast_name);
    let forecast = ingest::read_forecast(&forecast_path, issue)?;
    let observations = align(history, forecast.index(), variable)?;

    let mut files = Vec::new();
    match config.mode {
        GenerationMode::Deterministic => {
            let mut families = Vec::with_capacity(config.metrics.len());
            for &metric in &config.metrics {
                let family =
                    deterministic_family_from_ensemble(&observations, &forecast, &config.skills, metric)
                        .map_err(|error| StepError::for_metric(error, metric))?;
                let path = layout.deterministic_path(issue, &variable.forecast_name, metric);
                families.push((path, family));
            }
            let mean_path = config
                .write_mean
                .then(|| layout.mean_path(issue, &variable.forecast_name));
            ensure_distinct_paths(
                families
                    .iter()
                    .map(|(path, _)| path)
                    .chain(mean_path.as_ref()),
            )?;

            for (path, family) in &families {
                export::write_deterministic_family(path, family)
                    .map_err(|error| StepError::for_metric(error, family.metric))?;
                debug!(path = %path.display(), "wrote deterministic family");
                files.push(path.clone());
            }
            if let Some(path) = mean_path {
                export::write_mean_forecast(&path, &variable.forecast_name, &forecast.mean())?;
                debug!(path = %path.display(), "wrote mean forecast");
                files.push(path);
            }
        }
        GenerationMode::Ensemble => {
            let family = ensemble_family(&observations, &forecast, &config.skills)?;
            let paths: Vec<PathBuf> = family
                .skills()
                .map(|skill| layout.ensemble_path(issue, &variable.forecast_name, skill))
                .collect();
            ensure_distinct_paths(paths.iter())?;

            for (member, path) in family.iter().zip(paths) {
                export::write_ensemble(&path, &member.forecast)?;
                debug!(path = %path.display(), skill = %member.skill, "wrote ensemble member");
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Two artifacts of one date must never share a file.
///
/// Ensemble directories carry the skill rounded to two decimals, so `0.499`
/// and `0.501` would both land in `CRPSS=0.50`.
fn ensure_distinct_paths<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Result<(), FamilyError> {
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path) {
            return Err(FamilyError::InvalidArgument(format!(
                "more than one output maps to {}; use skills or metrics that give distinct file names",
                path.display()
            )));
        }
    }
    Ok(())
}
