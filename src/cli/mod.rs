//! Command-line parsing for the forecast family generator.
//!
//! Keeps **argument parsing** separate from the generators: arguments are turned
//! into a `FamilyConfig` in `app` and the library never sees argv.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{KindChoice, Metric, SkillValue};
use crate::io::TaggedLayout;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ffam",
    version,
    about = "Synthetic forecast families at controlled skill levels"
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). Overrides FAMILY_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Blend the ensemble mean with history: one table per issue date and metric.
    Deterministic(DeterministicArgs),
    /// Blend every ensemble member with history: one ensemble per issue date and skill.
    Ensemble(BatchArgs),
    /// Print the deterministic family for a single forecast file.
    Preview(PreviewArgs),
}

/// Which history column to blend against and how to treat it.
#[derive(Debug, Args, Clone)]
pub struct VariableArgs {
    /// Variable column in the history file (e.g. Temp, Rain, PET).
    #[arg(long)]
    pub variable: String,

    /// Variable name used in forecast file names, if it differs from the history column.
    #[arg(long)]
    pub forecast_variable: Option<String>,

    /// Flow variables (Rain, PET) are accumulated over the forecast window.
    #[arg(long, value_enum, default_value_t = KindChoice::Auto)]
    pub kind: KindChoice,
}

/// Skill levels to generate.
#[derive(Debug, Args, Clone)]
pub struct SkillArgs {
    /// Explicit skill values, in output order (e.g. `0,0.25,0.5`).
    #[arg(long, value_delimiter = ',', conflicts_with = "skill_steps")]
    pub skills: Vec<SkillValue>,

    /// Number of evenly spaced skills from 0 to 1 when `--skills` is not given.
    #[arg(long, default_value_t = 11)]
    pub skill_steps: usize,
}

/// Options shared by the batch commands.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Historical data CSV (`DD/MM/YYYY`, one column per variable).
    #[arg(long, value_name = "CSV")]
    pub history: PathBuf,

    /// Folder holding the original forecasts (default: FAMILY_FORECAST_DIR).
    #[arg(long, value_name = "DIR")]
    pub forecast_dir: Option<PathBuf>,

    /// Folder families are written to (default: FAMILY_OUTPUT_DIR).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub variable: VariableArgs,

    #[command(flatten)]
    pub skills: SkillArgs,

    /// First candidate issue date (`YYYY/MM/DD`).
    #[arg(long, value_parser = parse_cli_date)]
    pub begin: NaiveDate,

    /// Last candidate issue date, inclusive (`YYYY/MM/DD`).
    #[arg(long, value_parser = parse_cli_date)]
    pub end: NaiveDate,

    /// Tag between the issue date and the variable in file names.
    #[arg(long, default_value = TaggedLayout::DEFAULT_TAG)]
    pub tag: String,

    /// Generate issue dates in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Write a JSON report of generated and skipped dates.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,
}

/// Options for deterministic batches.
#[derive(Debug, Args, Clone)]
pub struct DeterministicArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Metric the skill is based on; repeat for one family per metric.
    #[arg(long = "metric", value_enum, ignore_case = true, default_values_t = [Metric::Mae])]
    pub metrics: Vec<Metric>,

    /// Also write the ensemble-mean forecast for each issue date.
    #[arg(long)]
    pub write_mean: bool,
}

/// Options for previewing a single forecast.
#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    /// Historical data CSV.
    #[arg(long, value_name = "CSV")]
    pub history: PathBuf,

    /// A single forecast CSV (one column per ensemble member).
    #[arg(long, value_name = "CSV")]
    pub forecast: PathBuf,

    #[command(flatten)]
    pub variable: VariableArgs,

    #[command(flatten)]
    pub skills: SkillArgs,

    /// Metric(s) to show.
    #[arg(long = "metric", value_enum, ignore_case = true, default_values_t = [Metric::Mae])]
    pub metrics: Vec<Metric>,

    /// Maximum rows to print per table.
    #[arg(long, default_value_t = 15)]
    pub rows: usize,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s)
}
