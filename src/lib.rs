//! `narmax-multio` library crate.
//!
//! Multi-objective parameter estimation for polynomial NARMAX models: the
//! parameters must fit time-series data, a measured static curve and a
//! measured static gain at once. Instead of a single answer the crate returns
//! a discretized trade-off front over a grid of convex objective weights.
//!
//! Layout:
//!
//! - `regressors`: structural regressor terms and the candidate-to-model mapping
//! - `steady_state`: static function (`QR`) and static gain (`HR`) matrices
//! - `fit`: weight grids and the weighted normal-equation sweep
//! - `pipeline`: the end-to-end workflow tying the stages together

pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod pipeline;
pub mod regressors;
pub mod steady_state;

pub use domain::{
    DynamicModel, EstimationConfig, FailurePolicy, ModelType, Objective, ParetoFront, StaticData,
    WeightSource,
};
pub use error::{ErrorKind, EstimationError, EstimationResult};
pub use pipeline::{Estimate, estimate, estimate_with_candidates};
