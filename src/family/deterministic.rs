//! Deterministic forecast families.
//!
//! Each requested skill produces one blended series. The whole family is
//! rejected if any skill is unusable for the chosen metric.

use crate::domain::{
    DeterministicFamily, Ensemble, FamilyMember, ForecastFamily, Metric, SkillValue, TimeSeries,
};
use crate::error::Result;
use crate::family::blend::{blend_values, ensure_aligned};
use crate::family::skill::weight;

/// Build a family from a deterministic point forecast.
///
/// Members are emitted in the order of `skills`, duplicates included.
pub fn deterministic_family(
    observations: &TimeSeries,
    forecast: &TimeSeries,
    skills: &[SkillValue],
    metric: Metric,
) -> Result<DeterministicFamily> {
    ensure_aligned(observations.index(), forecast.index())?;

    // Resolve every weight first so a bad skill aborts before any blending.
    let weights = skills
        .iter()
        .map(|&skill| weight(skill, metric).map(|w| (skill, w)))
        .collect::<Result<Vec<_>>>()?;

    let members = weights
        .into_iter()
        .map(|(skill, w)| FamilyMember {
            skill,
            forecast: TimeSeries::from_validated(
                forecast.index().to_vec(),
                blend_values(observations.values(), forecast.values(), w),
            ),
        })
        .collect();

    Ok(DeterministicFamily {
        metric,
        forecast: forecast.clone(),
        family: ForecastFamily::from_members(members),
    })
}

/// Build a family from an ensemble, using the member mean as the point forecast.
///
/// The mean is returned in [`DeterministicFamily::forecast`].
pub fn deterministic_family_from_ensemble(
    observations: &TimeSeries,
    ensemble: &Ensemble,
    skills: &[SkillValue],
    metric: Metric,
) -> Result<DeterministicFamily> {
    let mean = ensemble.mean();
    deterministic_family(observations, &mean, skills, metric)
}
