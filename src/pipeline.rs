//! Shared estimation pipeline.
//!
//! Keeping this in one place avoids every caller re-wiring the core workflow:
//! candidate space -> regressor mapping -> static matrices -> weights -> sweep
//!
//! Callers then only pick a trade-off point from the returned front.

use nalgebra::DMatrix;

use crate::domain::{DynamicModel, EstimationConfig, ParetoFront, StaticData, WeightSource};
use crate::error::{EstimationError, EstimationResult};
use crate::fit::{ObjectiveData, ObjectiveSet, resolve_weights, solve_multiobjective};
use crate::regressors::{CandidateSpace, MonomialSpace, RegressorMapping, Term, map_regressors};
use crate::steady_state::{build_static_function_matrix, build_static_gain_matrix};

/// All computed outputs of a single estimation.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub mapping: RegressorMapping,
    /// `QR`, when the static function objective is enabled.
    pub static_function_matrix: Option<DMatrix<f64>>,
    /// `HR`, when the static gain objective is enabled.
    pub static_gain_matrix: Option<DMatrix<f64>>,
    pub front: ParetoFront,
}

/// Run the estimation with the lag-1 monomial candidate space described by
/// `config`.
pub fn estimate(
    config: &EstimationConfig,
    model: &DynamicModel,
    statics: &StaticData,
    weights: &WeightSource,
) -> EstimationResult<Estimate> {
    config.validate()?;
    let candidates =
        MonomialSpace::new(config.model_type).candidates(config.degree, config.n_inputs)?;
    estimate_with_candidates(config, &candidates, model, statics, weights)
}

/// Run the estimation against a candidate space supplied by the caller.
pub fn estimate_with_candidates(
    config: &EstimationConfig,
    candidates: &[Term],
    model: &DynamicModel,
    statics: &StaticData,
    weights: &WeightSource,
) -> EstimationResult<Estimate> {
    config.validate()?;
    if model.regressors.ncols() != model.terms.len() {
        return Err(EstimationError::dimension(
            "dynamic regressor columns",
            model.terms.len(),
            model.regressors.ncols(),
        ));
    }

    let mapping = map_regressors(candidates, &model.terms)?;

    let static_function_matrix = if config.static_function {
        if statics.n_samples() == 0 {
            return Err(EstimationError::MissingStaticData("static function".into()));
        }
        Some(build_static_function_matrix(
            &mapping,
            &statics.output,
            &statics.inputs,
            config.n_inputs,
        )?)
    } else {
        None
    };

    let static_gain = if config.static_gain {
        let gain = statics
            .gain
            .as_ref()
            .filter(|g| !g.is_empty())
            .ok_or_else(|| EstimationError::MissingStaticData("static gain".into()))?;
        let hr = build_static_gain_matrix(
            &mapping,
            &statics.output,
            &statics.inputs,
            gain,
            config.n_inputs,
        )?;
        Some((hr, gain))
    } else {
        None
    };

    log::debug!(
        "Estimating {} parameters from {} dynamic samples and {} static samples.",
        model.terms.len(),
        model.target.len(),
        statics.n_samples()
    );

    let objectives = ObjectiveSet::new(
        ObjectiveData::new(&model.regressors, &model.target),
        static_function_matrix
            .as_ref()
            .map(|qr| ObjectiveData::new(qr, &statics.output)),
        static_gain
            .as_ref()
            .map(|(hr, gain)| ObjectiveData::new(hr, *gain)),
    )?;

    let w = resolve_weights(weights, config, objectives.len())?;
    let front = solve_multiobjective(
        &objectives,
        &w,
        config.failure_policy,
        config.weight_tolerance,
    )?;

    Ok(Estimate {
        mapping,
        static_function_matrix,
        static_gain_matrix: static_gain.map(|(hr, _)| hr),
        front,
    })
}
