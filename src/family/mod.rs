//! Forecast family generation.
//!
//! Responsibilities:
//!
//! - map a skill value to a blend weight (`weight`)
//! - blend observations with a forecast (`blend`)
//! - build deterministic families from a point forecast or an ensemble mean
//! - build ensemble families member by member
//!
//! Both generators go through the same weight + blend core. Their skill
//! conventions differ and are kept as separate code paths: the deterministic path
//! depends on the metric, the ensemble path always uses `weight = 1 - skill`.

pub mod blend;
pub mod deterministic;
pub mod ensemble;
pub mod skill;

pub use blend::*;
pub use deterministic::*;
pub use ensemble::*;
pub use skill::*;
