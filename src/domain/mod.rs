//! Domain types used throughout the generators and the batch pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`Metric`, `VariableKind`, `KindChoice`, `GenerationMode`)
//! - skill values and their labels (`SkillValue`)
//! - the time-indexed containers (`TimeSeries`, `Ensemble`)
//! - generator outputs (`ForecastFamily`, `DeterministicFamily`)

pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
