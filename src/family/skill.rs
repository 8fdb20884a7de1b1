//! Skill-to-weight mapping.
//!
//! The weight is the share of the original forecast kept in a blended member:
//! `1` reproduces the forecast, `0` reproduces the observations.

use crate::domain::{Metric, SkillValue};
use crate::error::{FamilyError, Result};

/// Blend weight for a deterministic forecast with the given skill.
///
/// - MAE: `1 - skill`
/// - MSE: `sqrt(1 - skill)`, undefined (and an error) for `skill > 1`
pub fn weight(skill: SkillValue, metric: Metric) -> Result<f64> {
    let s = skill.value();
    match metric {
        Metric::Mae => Ok(1.0 - s),
        Metric::Mse => {
            let radicand = 1.0 - s;
            if radicand < 0.0 {
                return Err(FamilyError::Domain { skill: s });
            }
            Ok(radicand.sqrt())
        }
    }
}

/// Blend weight for an ensemble member with the given CRPSS-based skill.
pub fn ensemble_weight(skill: SkillValue) -> f64 {
    1.0 - skill.value()
}
