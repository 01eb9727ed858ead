//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from a configuration file (`EstimationConfig`)
//! - handed over by a structure selector (`DynamicModel`)
//! - returned to the caller and persisted or plotted there (`ParetoFront`)

use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{EstimationError, EstimationResult};
use crate::fit::MIN_WEIGHT_STEP;
use crate::regressors::Term;

/// Polynomial model family of the candidate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Output and input terms.
    Narmax,
    /// Output terms only.
    Nar,
    /// Input terms only.
    Nfir,
}

impl ModelType {
    pub fn has_output_terms(self) -> bool {
        matches!(self, ModelType::Narmax | ModelType::Nar)
    }

    pub fn has_input_terms(self) -> bool {
        matches!(self, ModelType::Narmax | ModelType::Nfir)
    }
}

/// One fit objective of the multi-objective problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Time-series fit `‖y - Ψθ‖²`.
    Dynamic,
    /// Static curve fit `‖Y_static - QRθ‖²`.
    StaticFunction,
    /// Static gain fit `‖Gain - HRθ‖²`.
    StaticGain,
}

impl Objective {
    pub fn display_name(self) -> &'static str {
        match self {
            Objective::Dynamic => "dynamic",
            Objective::StaticFunction => "static function",
            Objective::StaticGain => "static gain",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What happens when a weight column's normal equations cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole sweep with the lowest-index column error.
    Abort,
    /// Fill the column with NaN and keep going.
    SkipColumn,
}

/// Estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimationConfig {
    pub n_inputs: usize,
    /// Nonlinearity degree of the candidate space.
    pub degree: usize,
    pub model_type: ModelType,
    /// Decoding factor for packed regressor codes.
    pub scale_factor: u32,
    /// First coordinate of the weight grid (kept away from 0).
    pub weight_start: f64,
    pub weight_step: f64,
    /// Column-sum tolerance for user-supplied weight matrices.
    pub weight_tolerance: f64,
    pub static_function: bool,
    pub static_gain: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            n_inputs: 1,
            degree: 2,
            model_type: ModelType::Narmax,
            scale_factor: 1000,
            weight_start: 0.01,
            weight_step: 0.05,
            weight_tolerance: 1e-9,
            static_function: true,
            static_gain: true,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EstimationConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> EstimationResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EstimationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EstimationResult<()> {
        if self.degree == 0 {
            return Err(EstimationError::InvalidConfig("degree must be >= 1".into()));
        }
        if self.scale_factor < 2 {
            return Err(EstimationError::InvalidConfig(format!(
                "scale_factor must be >= 2, got {}",
                self.scale_factor
            )));
        }
        if !(self.weight_step.is_finite() && self.weight_step >= MIN_WEIGHT_STEP) {
            return Err(EstimationError::InvalidConfig(format!(
                "weight_step must be finite and >= {MIN_WEIGHT_STEP}, got {}",
                self.weight_step
            )));
        }
        if !(self.weight_start > 0.0 && self.weight_start < 1.0) {
            return Err(EstimationError::InvalidConfig(format!(
                "weight_start must lie in (0, 1), got {}",
                self.weight_start
            )));
        }
        if !(self.weight_tolerance.is_finite() && self.weight_tolerance > 0.0) {
            return Err(EstimationError::InvalidConfig(format!(
                "weight_tolerance must be finite and > 0, got {}",
                self.weight_tolerance
            )));
        }
        Ok(())
    }

    /// Dynamic objective plus each enabled static objective.
    pub fn active_objective_count(&self) -> usize {
        1 + usize::from(self.static_function) + usize::from(self.static_gain)
    }
}

/// Steady-state measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticData {
    /// `X_static`, one row per operating point, one column per input.
    pub inputs: DMatrix<f64>,
    /// `Y_static`, steady-state output per operating point.
    pub output: DVector<f64>,
    /// Measured static gain per operating point, if available.
    pub gain: Option<DVector<f64>>,
}

impl StaticData {
    pub fn n_samples(&self) -> usize {
        self.output.len()
    }
}

/// The dynamic model handed over by the structure selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicModel {
    /// Selected regressors, in the column order of `regressors`.
    pub terms: Vec<Term>,
    /// `Ψ`, one column per selected regressor.
    pub regressors: DMatrix<f64>,
    /// Training target `y`.
    pub target: DVector<f64>,
}

impl DynamicModel {
    /// Build from packed regressor codes, one row per selected regressor.
    pub fn from_codes(
        codes: &[Vec<u32>],
        regressors: DMatrix<f64>,
        target: DVector<f64>,
        n_inputs: usize,
        scale_factor: u32,
    ) -> EstimationResult<Self> {
        let terms = codes
            .iter()
            .map(|row| Term::from_codes(row, n_inputs, scale_factor))
            .collect::<EstimationResult<Vec<_>>>()?;
        Ok(Self {
            terms,
            regressors,
            target,
        })
    }
}

/// Where the weight grid comes from.
#[derive(Debug, Clone, Default)]
pub enum WeightSource {
    /// Generate the grid from the configured start/step.
    #[default]
    Grid,
    /// A caller-built matrix, one row per active objective.
    Matrix(DMatrix<f64>),
}

/// Discretized trade-off front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoFront {
    /// Row labels of `residuals` / `raw_residuals`.
    pub objectives: Vec<Objective>,
    /// `J` normalized by its global maximum.
    pub residuals: DMatrix<f64>,
    /// `J` before normalization.
    pub raw_residuals: DMatrix<f64>,
    /// `W`, one column per trade-off point.
    pub weights: DMatrix<f64>,
    /// `E`, Euclidean norm of each normalized `J` column.
    pub scores: DVector<f64>,
    /// `Array_theta`, row `i` is the parameter vector of weight column `i`.
    pub thetas: DMatrix<f64>,
    /// Columns whose system could not be solved (only with `SkipColumn`).
    pub failed_columns: Vec<usize>,
}

impl ParetoFront {
    pub fn len(&self) -> usize {
        self.weights.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn theta(&self, column: usize) -> Option<DVector<f64>> {
        (column < self.thetas.nrows()).then(|| self.thetas.row(column).transpose())
    }

    /// Residual row of `objective`, if it was active.
    pub fn objective_row(&self, objective: Objective) -> Option<usize> {
        self.objectives.iter().position(|&o| o == objective)
    }

    /// Column with the lowest finite score; ties go to the lowest index.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &e) in self.scores.iter().enumerate() {
            if !e.is_finite() {
                continue;
            }
            match best {
                Some((_, b)) if e >= b => {}
                _ => best = Some((i, e)),
            }
        }
        best.map(|(i, _)| i)
    }
}
