//! Error types.
//!
//! Two layers:
//!
//! - [`FamilyError`]: the library taxonomy (argument, domain, alignment, missing data,
//!   missing forecast, plus file plumbing). Only `MissingForecast` is recoverable at
//!   the batch level.
//! - [`AppError`]: what the `ffam` binary reports, carrying a process exit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, FamilyError>;

#[derive(Debug, Error)]
pub enum FamilyError {
    /// Unusable caller input (unknown metric, non-finite skill, empty ensemble, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The MSE weight `sqrt(1 - skill)` has a negative radicand.
    #[error("MSE weight is undefined for skill {skill} (requires skill <= 1)")]
    Domain { skill: f64 },

    /// Observation and forecast indices disagree.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// A forecast timestamp has no usable historical record.
    #[error("no historical '{variable}' value for {date}")]
    MissingData { variable: String, date: NaiveDate },

    /// The forecast artifact for an issue date does not exist.
    #[error("no forecast issued {issue_date} at '{}'", .path.display())]
    MissingForecast { issue_date: NaiveDate, path: PathBuf },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{}': {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    #[error("JSON error in '{}': {message}", .path.display())]
    Json { path: PathBuf, message: String },

    #[error("'{}' line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl FamilyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FamilyError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        FamilyError::Csv {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether a batch should skip the offending date and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FamilyError::MissingForecast { .. })
    }

    /// Exit code used when this error ends the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            FamilyError::InvalidArgument(_)
            | FamilyError::Io { .. }
            | FamilyError::Csv { .. }
            | FamilyError::Json { .. }
            | FamilyError::Parse { .. } => 2,
            FamilyError::MissingData { .. } | FamilyError::MissingForecast { .. } => 3,
            FamilyError::Alignment(_) | FamilyError::Domain { .. } => 4,
        }
    }
}

/// Error surfaced by the binary: a message plus the exit code to return.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Wrap a library error with the run context it happened in.
    pub fn with_context(err: &FamilyError, context: impl std::fmt::Display) -> Self {
        Self::new(err.exit_code(), format!("{context}: {err}"))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FamilyError> for AppError {
    fn from(err: FamilyError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_forecast_is_recoverable() {
        let date = NaiveDate::from_ymd_opt(1969, 2, 1).unwrap();
        let missing = FamilyError::MissingForecast {
            issue_date: date,
            path: PathBuf::from("f.csv"),
        };
        assert!(missing.is_recoverable());
        assert!(!FamilyError::Domain { skill: 1.5 }.is_recoverable());
        assert!(
            !FamilyError::MissingData {
                variable: "Rain".to_string(),
                date
            }
            .is_recoverable()
        );
    }

    #[test]
    fn app_error_keeps_exit_code_and_context() {
        let err = FamilyError::InvalidArgument("unknown metric 'RMSE'".to_string());
        let app = AppError::with_context(&err, "1969-01-01 Temp");
        assert_eq!(app.exit_code(), 2);
        assert_eq!(
            app.to_string(),
            "1969-01-01 Temp: invalid argument: unknown metric 'RMSE'"
        );
    }
}
