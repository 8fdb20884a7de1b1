//! `forecast-families` library crate.
//!
//! Generates synthetic forecasts at chosen skill levels by blending historical
//! observations with an existing forecast (deterministic or ensemble).
//!
//! The binary (`ffam`) is a thin wrapper around this library so that:
//!
//! - the generators are testable without spawning processes
//! - file layout and CSV handling stay outside the blending core
//! - batch drivers other than the CLI can reuse the same pipeline

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod family;
pub mod io;
pub mod report;
pub mod schedule;
pub mod series;
