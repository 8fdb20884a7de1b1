//! End-to-end batch runs over a small on-disk dataset.
//!
//! History covers the first days of January and March 1969. Forecasts exist for
//! the January and March issues; February's file is absent.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use forecast_families::domain::{
    FamilyConfig, GenerationMode, Metric, SkillValue, Variable, VariableKind, skill_grid,
};
use forecast_families::io::{FamilyLayout, TaggedLayout, read_report_json, write_report_json};
use forecast_families::report::Outcome;
use forecast_families::app::pipeline::run_batch;
use tempfile::TempDir;

const HISTORY: &str = "\
Date,Temp,Rain
31/12/1968,1.0,2.0
1/1/1969,1.0,2.0
2/1/1969,1.0,2.0
3/1/1969,1.0,2.0
4/1/1969,1.0,2.0
1/3/1969,0.0,1.0
2/3/1969,0.0,1.0
";

const TEMP_JAN: &str = "\
Date,1,2,3
1/1/1969,1.5,2.0,2.5
2/1/1969,0.5,1.0,0.0
3/1/1969,-1.0,3.0,1.0
";

const RAIN_JAN: &str = "\
Date,1,2,3
1/1/1969,2.5,3.0,3.5
2/1/1969,4.0,5.0,4.5
3/1/1969,4.0,9.0,6.5
";

const TEMP_MAR: &str = "\
Date,1,2
1969/03/01,2.0,4.0
1969/03/02,1.0,1.0
";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let forecasts = root.join("original_forecasts");
        fs::create_dir_all(&forecasts).unwrap();
        fs::write(root.join("clim_data.csv"), HISTORY).unwrap();
        fs::write(forecasts.join("19690101_1d_7m_ECMWF_Temp.csv"), TEMP_JAN).unwrap();
        fs::write(forecasts.join("19690101_1d_7m_ECMWF_Rain.csv"), RAIN_JAN).unwrap();
        fs::write(forecasts.join("19690301_1d_7m_ECMWF_Temp.csv"), TEMP_MAR).unwrap();
        Self { _dir: dir, root }
    }

    fn config(&self, column: &str, mode: GenerationMode, end: NaiveDate) -> FamilyConfig {
        FamilyConfig {
            history_file: self.root.join("clim_data.csv"),
            forecast_dir: self.root.join("original_forecasts"),
            output_dir: self.root.join("families"),
            file_tag: TaggedLayout::DEFAULT_TAG.to_string(),
            variable: Variable {
                history_column: column.to_string(),
                forecast_name: column.to_string(),
                kind: VariableKind::for_column(column),
            },
            mode,
            skills: skill_grid(0.0, 1.0, 3).unwrap(),
            metrics: vec![Metric::Mae, Metric::Mse],
            begin: ymd(1969, 1, 1),
            end,
            parallel: false,
            write_mean: true,
            report: None,
        }
    }
}

/// Header and numeric rows of a written family table.
fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<f64>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| {
            r.unwrap()
                .iter()
                .skip(1)
                .map(|v| v.parse::<f64>().unwrap())
                .collect()
        })
        .collect();
    (header, rows)
}

fn column(rows: &[Vec<f64>], idx: usize) -> Vec<f64> {
    rows.iter().map(|r| r[idx]).collect()
}

#[test]
fn deterministic_batch_skips_missing_month() {
    let fx = Fixture::new();
    let config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 3, 1));
    let layout = TaggedLayout::from_config(&config);

    let report = run_batch(&config, &layout).unwrap();

    let dates: Vec<NaiveDate> = report.dates.iter().map(|d| d.issue_date).collect();
    assert_eq!(dates, [ymd(1969, 1, 1), ymd(1969, 2, 1), ymd(1969, 3, 1)]);
    assert!(matches!(report.dates[0].outcome, Outcome::Generated { ref files } if files.len() == 3));
    assert!(matches!(report.dates[1].outcome, Outcome::Skipped { .. }));
    assert!(matches!(report.dates[2].outcome, Outcome::Generated { .. }));

    let (header, rows) = read_table(&layout.deterministic_path(ymd(1969, 1, 1), "Temp", Metric::Mae));
    assert_eq!(header, ["Date", "S=0.0", "S=0.5", "S=1.0"]);

    let (_, mean_rows) = read_table(&layout.mean_path(ymd(1969, 1, 1), "Temp"));
    let mean = column(&mean_rows, 0);
    assert_eq!(column(&rows, 0), mean);
    assert_eq!(column(&rows, 2), [1.0, 1.0, 1.0]);

    let (_, march) = read_table(&layout.deterministic_path(ymd(1969, 3, 1), "Temp", Metric::Mae));
    assert_eq!(column(&march, 0), [3.0, 1.0]);
    assert_eq!(column(&march, 1), [1.5, 0.5]);
    assert_eq!(column(&march, 2), [0.0, 0.0]);
}

#[test]
fn flow_history_is_accumulated_before_blending() {
    let fx = Fixture::new();
    let config = fx.config("Rain", GenerationMode::Deterministic, ymd(1969, 1, 1));
    let layout = TaggedLayout::from_config(&config);
    run_batch(&config, &layout).unwrap();

    let (_, rows) = read_table(&layout.deterministic_path(ymd(1969, 1, 1), "Rain", Metric::Mse));
    assert_eq!(column(&rows, 2), [2.0, 4.0, 6.0]);
    assert_eq!(column(&rows, 0), [3.0, 4.5, 6.5]);
}

#[test]
fn ensemble_batch_writes_one_directory_per_skill() {
    let fx = Fixture::new();
    let config = fx.config("Temp", GenerationMode::Ensemble, ymd(1969, 2, 1));
    let layout = TaggedLayout::from_config(&config);

    let report = run_batch(&config, &layout).unwrap();
    assert!(report.metrics.is_empty());
    assert_eq!(report.generated().count(), 1);
    assert_eq!(report.skipped().count(), 1);

    let skill = |v: f64| SkillValue::new(v).unwrap();
    let issue = ymd(1969, 1, 1);

    let full = layout.ensemble_path(issue, "Temp", skill(1.0));
    assert!(full.parent().unwrap().ends_with("ECMWF_Ensemble_skill_CRPSS=1.00"));
    let (header, rows) = read_table(&full);
    assert_eq!(header, ["Date", "1", "2", "3"]);
    assert!(rows.iter().flatten().all(|v| *v == 1.0));

    let (_, original) = read_table(&layout.ensemble_path(issue, "Temp", skill(0.0)));
    assert_eq!(original[0], [1.5, 2.0, 2.5]);
    assert_eq!(original[2], [-1.0, 3.0, 1.0]);

    let (_, half) = read_table(&layout.ensemble_path(issue, "Temp", skill(0.5)));
    assert_eq!(half[0], [1.25, 1.5, 1.75]);
    assert_eq!(half[2], [0.0, 2.0, 1.0]);
}

#[test]
fn parallel_batch_reports_in_date_order() {
    let fx = Fixture::new();
    let sequential = fx.config("Temp", GenerationMode::Ensemble, ymd(1969, 6, 1));
    let mut parallel = sequential.clone();
    parallel.parallel = true;
    parallel.output_dir = fx.root.join("families_parallel");

    let a = run_batch(&sequential, &TaggedLayout::from_config(&sequential)).unwrap();
    let b = run_batch(&parallel, &TaggedLayout::from_config(&parallel)).unwrap();

    let status = |r: &forecast_families::report::BatchReport| -> Vec<(NaiveDate, bool)> {
        r.dates
            .iter()
            .map(|d| (d.issue_date, matches!(d.outcome, Outcome::Generated { .. })))
            .collect()
    };
    assert_eq!(status(&a), status(&b));
    assert_eq!(a.dates.len(), 6);
}

#[test]
fn fatal_errors_abort_with_context() {
    let fx = Fixture::new();
    let mut config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 1, 1));
    config.skills = vec![SkillValue::new(1.5).unwrap()];
    config.metrics = vec![Metric::Mse];

    let err = run_batch(&config, &TaggedLayout::from_config(&config)).unwrap_err();
    assert_eq!(err.exit_code(), 4);
    let message = err.to_string();
    assert!(message.contains("1969-01-01"), "{message}");
    assert!(message.contains("MSE"), "{message}");

    let mut unknown = fx.config("Wind", GenerationMode::Ensemble, ymd(1969, 1, 1));
    unknown.variable.forecast_name = "Temp".to_string();
    let err = run_batch(&unknown, &TaggedLayout::from_config(&unknown)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn history_gap_in_forecast_window_is_missing_data() {
    let fx = Fixture::new();
    // March 3rd has no history row.
    fs::write(
        fx.root.join("original_forecasts/19690301_1d_7m_ECMWF_Temp.csv"),
        "Date,1\n1969/03/01,2.0\n1969/03/02,1.0\n1969/03/03,1.0\n",
    )
    .unwrap();
    let mut config = fx.config("Temp", GenerationMode::Ensemble, ymd(1969, 3, 1));
    config.begin = ymd(1969, 3, 1);

    let err = run_batch(&config, &TaggedLayout::from_config(&config)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("1969-03-03"));
}

#[test]
fn report_round_trips_through_json() {
    let fx = Fixture::new();
    let config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 2, 1));
    let report = run_batch(&config, &TaggedLayout::from_config(&config)).unwrap();

    let path = fx.root.join("report.json");
    write_report_json(&path, &report).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"status\": \"skipped\""));
    assert!(text.contains("\"MAE\""));
    assert_eq!(read_report_json(&path).unwrap(), report);
}

#[test]
fn sequential_batch_stops_at_first_fatal_date() {
    let fx = Fixture::new();
    // January 3rd is inside the January forecast window.
    let gappy: String = HISTORY
        .lines()
        .filter(|l| !l.starts_with("3/1/1969"))
        .map(|l| format!("{l}\n"))
        .collect();
    fs::write(fx.root.join("clim_data.csv"), gappy).unwrap();
    let config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 3, 1));
    let layout = TaggedLayout::from_config(&config);

    let err = run_batch(&config, &layout).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("1969-01-01"), "{err}");

    let march = ymd(1969, 3, 1);
    assert!(!layout.deterministic_path(march, "Temp", Metric::Mae).exists());
    assert!(!layout.mean_path(march, "Temp").exists());
}

#[test]
fn failing_metric_leaves_no_partial_date() {
    let fx = Fixture::new();
    let mut config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 1, 1));
    config.skills = vec![SkillValue::new(0.5).unwrap(), SkillValue::new(1.5).unwrap()];
    let layout = TaggedLayout::from_config(&config);

    let err = run_batch(&config, &layout).unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(err.to_string().contains("MSE"), "{err}");

    let issue = ymd(1969, 1, 1);
    assert!(!layout.deterministic_path(issue, "Temp", Metric::Mae).exists());
    assert!(!layout.mean_path(issue, "Temp").exists());
}

#[test]
fn write_failures_name_the_metric() {
    let fx = Fixture::new();
    let config = fx.config("Temp", GenerationMode::Deterministic, ymd(1969, 1, 1));
    let layout = TaggedLayout::from_config(&config);
    // A directory where the MSE table should go makes the write fail.
    fs::create_dir_all(layout.deterministic_path(ymd(1969, 1, 1), "Temp", Metric::Mse)).unwrap();

    let err = run_batch(&config, &layout).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    let message = err.to_string();
    assert!(message.contains("1969-01-01"), "{message}");
    assert!(message.contains("metric MSE"), "{message}");
}

#[test]
fn ensemble_skills_sharing_a_directory_are_rejected() {
    let fx = Fixture::new();
    let mut config = fx.config("Temp", GenerationMode::Ensemble, ymd(1969, 1, 1));
    config.skills = vec![SkillValue::new(0.499).unwrap(), SkillValue::new(0.501).unwrap()];
    let layout = TaggedLayout::from_config(&config);

    let err = run_batch(&config, &layout).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("CRPSS=0.50"), "{err}");
    assert!(!layout.ensemble_path(ymd(1969, 1, 1), "Temp", config.skills[0]).exists());
}
