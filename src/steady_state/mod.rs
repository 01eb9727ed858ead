//! Static (steady-state) regression matrices.
//!
//! At an operating point `(X, Y)` every lagged copy of a variable takes the
//! same value, so each dynamic regressor collapses to the monomial
//! `Y^e_y · Π_k X_k^e_k` given by its exponent pattern.
//!
//! - `QR`: those monomials, fitted against `Y_static`
//! - `HR`: their derivative-based counterpart, fitted against the measured gain
//!
//! Both are built in pattern space and projected onto the selected model's
//! columns through the mapping's assignment matrix.

pub mod function;
pub mod gain;

pub use function::*;
pub use gain::*;

use nalgebra::{DMatrix, DVector};

use crate::error::{EstimationError, EstimationResult};
use crate::regressors::RegressorMapping;

fn check_static_inputs(
    mapping: &RegressorMapping,
    y_static: &DVector<f64>,
    x_static: &DMatrix<f64>,
    n_inputs: usize,
) -> EstimationResult<()> {
    if x_static.ncols() != n_inputs {
        return Err(EstimationError::dimension(
            "static input columns",
            n_inputs,
            x_static.ncols(),
        ));
    }
    if x_static.nrows() != y_static.len() {
        return Err(EstimationError::dimension(
            "static input samples",
            y_static.len(),
            x_static.nrows(),
        ));
    }
    if mapping.n_inputs() != n_inputs {
        return Err(EstimationError::dimension(
            "regressor pattern inputs",
            n_inputs,
            mapping.n_inputs(),
        ));
    }
    Ok(())
}
