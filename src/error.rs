//! Error type shared by every estimation stage.
//!
//! Errors fall in two groups (see [`ErrorKind`]):
//!
//! - configuration errors: the inputs disagree with each other (shapes,
//!   mappings, weights, settings). Retrying cannot help.
//! - numerical errors: a weight column produced a singular or non-finite
//!   normal-equation system.

use thiserror::Error;

/// Broad classification of an [`EstimationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Numerical,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("Regressor shape mismatch: expected {expected} variable slots, found {found} ({context}).")]
    ShapeMismatch {
        expected: usize,
        found: usize,
        context: String,
    },

    #[error("Dimension mismatch for {what}: expected {expected}, found {found}.")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "None of the {candidates} candidate regressors matches the {selected} selected regressors; the inputs come from incompatible configurations."
    )]
    EmptyMapping { candidates: usize, selected: usize },

    #[error("Selected regressors {first} and {second} share the exponent pattern {pattern}.")]
    DuplicatePattern {
        pattern: String,
        first: usize,
        second: usize,
    },

    #[error("Selected regressor {index} ({term}) has no counterpart in the candidate space.")]
    UnmappedRegressor { index: usize, term: String },

    #[error("Regressor code {code} refers to input {input}, but only {n_inputs} inputs are configured.")]
    UnknownVariable {
        code: u32,
        input: usize,
        n_inputs: usize,
    },

    #[error("Invalid weight matrix: {0}")]
    InvalidWeights(String),

    #[error("The {0} objective is enabled but no matching static data was supplied.")]
    MissingStaticData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Normal equations for weight column {column} are singular and cannot be inverted.")]
    SingularSystem { column: usize },

    #[error("Weight column {column} produced a non-finite parameter vector or residual.")]
    NonFiniteSolution { column: usize },
}

impl EstimationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EstimationError::SingularSystem { .. } | EstimationError::NonFiniteSolution { .. } => {
                ErrorKind::Numerical
            }
            _ => ErrorKind::Configuration,
        }
    }

    pub(crate) fn dimension(what: impl Into<String>, expected: usize, found: usize) -> Self {
        EstimationError::DimensionMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}

pub type EstimationResult<T> = Result<T, EstimationError>;
