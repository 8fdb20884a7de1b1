//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and initialises logging
//! - parses CLI arguments into a `FamilyConfig`
//! - runs the batch pipeline or a single-forecast preview
//! - prints the summary and writes the optional JSON report

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, DeterministicArgs, PreviewArgs, SkillArgs, VariableArgs};
use crate::domain::{FamilyConfig, GenerationMode, Metric, SkillValue, Variable, skill_grid};
use crate::error::AppError;
use crate::family::deterministic_family_from_ensemble;
use crate::io::{TaggedLayout, ingest, write_report_json};
use crate::series::align;

pub mod pipeline;

/// Environment variable holding the log filter (`info`, `debug`, `ffam=trace`, ...).
pub const LOG_ENV: &str = "FAMILY_LOG";
pub const FORECAST_DIR_ENV: &str = "FAMILY_FORECAST_DIR";
pub const OUTPUT_DIR_ENV: &str = "FAMILY_OUTPUT_DIR";

/// Entry point for the `ffam` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Deterministic(args) => handle_deterministic(args),
        Command::Ensemble(args) => handle_batch(family_config_from_args(&args, GenerationMode::Ensemble, &[], false)?),
        Command::Preview(args) => handle_preview(args),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_deterministic(args: DeterministicArgs) -> Result<(), AppError> {
    let config = family_config_from_args(
        &args.batch,
        GenerationMode::Deterministic,
        &args.metrics,
        args.write_mean,
    )?;
    handle_batch(config)
}

fn handle_batch(config: FamilyConfig) -> Result<(), AppError> {
    let layout = TaggedLayout::from_config(&config);
    let report = pipeline::run_batch(&config, &layout)?;

    println!("{}", crate::report::format_batch_summary(&report));

    if let Some(path) = &config.report {
        write_report_json(path, &report)?;
    }
    Ok(())
}

fn handle_preview(args: PreviewArgs) -> Result<(), AppError> {
    let variable = variable_from_args(&args.variable);
    let skills = resolve_skills(&args.skills)?;

    let history = ingest::read_history(&args.history)?.series(&variable.history_column)?;
    let forecast = ingest::read_forecast_file(&args.forecast)?;
    let observations = align(&history, forecast.index(), &variable)?;

    println!(
        "{}: {} member(s), {} day(s) from {}",
        args.forecast.display(),
        forecast.member_count(),
        forecast.len(),
        forecast.index().first().map(|d| d.to_string()).unwrap_or_default()
    );
    for &metric in &args.metrics {
        let family = deterministic_family_from_ensemble(&observations, &forecast, &skills, metric)
            .map_err(|e| AppError::with_context(&e, format!("metric {metric}")))?;
        println!(
            "{}",
            crate::report::format_family_table(&observations, &family, args.rows)
        );
    }
    Ok(())
}

/// Build the pipeline configuration from batch flags (plus `.env` defaults).
pub fn family_config_from_args(
    args: &BatchArgs,
    mode: GenerationMode,
    metrics: &[Metric],
    write_mean: bool,
) -> Result<FamilyConfig, AppError> {
    let forecast_dir = dir_or_env(&args.forecast_dir, FORECAST_DIR_ENV, "--forecast-dir")?;
    let output_dir = dir_or_env(&args.output_dir, OUTPUT_DIR_ENV, "--output-dir")?;

    Ok(FamilyConfig {
        history_file: args.history.clone(),
        forecast_dir,
        output_dir,
        file_tag: args.tag.clone(),
        variable: variable_from_args(&args.variable),
        mode,
        skills: resolve_skills(&args.skills)?,
        metrics: metrics.to_vec(),
        begin: args.begin,
        end: args.end,
        parallel: args.parallel,
        write_mean,
        report: args.report.clone(),
    })
}

fn variable_from_args(args: &VariableArgs) -> Variable {
    Variable {
        history_column: args.variable.clone(),
        forecast_name: args
            .forecast_variable
            .clone()
            .unwrap_or_else(|| args.variable.clone()),
        kind: args.kind.resolve(&args.variable),
    }
}

fn resolve_skills(args: &SkillArgs) -> Result<Vec<SkillValue>, AppError> {
    if !args.skills.is_empty() {
        return Ok(args.skills.clone());
    }
    Ok(skill_grid(0.0, 1.0, args.skill_steps)?)
}

fn dir_or_env(flag: &Option<PathBuf>, env: &str, name: &str) -> Result<PathBuf, AppError> {
    if let Some(dir) = flag {
        return Ok(dir.clone());
    }
    std::env::var_os(env)
        .map(PathBuf::from)
        .ok_or_else(|| AppError::new(2, format!("Missing {name} (or set {env} in the environment or .env).")))
}
