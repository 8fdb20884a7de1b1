//! Ensemble forecast families.
//!
//! Every member is blended with the same observations using the CRPSS
//! convention `weight = 1 - skill`. Output ensembles keep the input's member
//! names, member count and index.

use crate::domain::{Ensemble, EnsembleFamily, FamilyMember, ForecastFamily, SkillValue, TimeSeries};
use crate::error::Result;
use crate::family::blend::{blend_values, ensure_aligned};
use crate::family::skill::ensemble_weight;

/// Build one blended ensemble per requested skill, in request order.
pub fn ensemble_family(
    observations: &TimeSeries,
    forecast: &Ensemble,
    skills: &[SkillValue],
) -> Result<EnsembleFamily> {
    ensure_aligned(observations.index(), forecast.index())?;

    let members = skills
        .iter()
        .map(|&skill| {
            let w = ensemble_weight(skill);
            FamilyMember {
                skill,
                forecast: forecast.map_members(|values| blend_values(observations.values(), values, w)),
            }
        })
        .collect();

    Ok(ForecastFamily::from_members(members))
}
