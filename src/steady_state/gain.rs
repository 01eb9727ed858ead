//! Static gain regression matrix `HR`.
//!
//! For retained pattern `j` and sample `i`:
//!
//! ```text
//! H[i, j] = Gain[i] · e_y · Y[i]^(e_y - 1)  +  Σ_k e_k · X[i, k]^(e_k - 1)
//! ```
//!
//! Each derivative term is exactly 0 when its base is 0 (see
//! [`saturated_derivative`]).

use nalgebra::{DMatrix, DVector};

use crate::error::{EstimationError, EstimationResult};
use crate::math::saturated_derivative;
use crate::regressors::RegressorMapping;
use crate::steady_state::check_static_inputs;

/// Build `HR`, same shape as `QR`.
pub fn build_static_gain_matrix(
    mapping: &RegressorMapping,
    y_static: &DVector<f64>,
    x_static: &DMatrix<f64>,
    gain: &DVector<f64>,
    n_inputs: usize,
) -> EstimationResult<DMatrix<f64>> {
    check_static_inputs(mapping, y_static, x_static, n_inputs)?;
    if gain.len() != y_static.len() {
        return Err(EstimationError::dimension(
            "static gain samples",
            y_static.len(),
            gain.len(),
        ));
    }

    let h = DMatrix::from_fn(y_static.len(), mapping.n_patterns(), |i, j| {
        let pattern = &mapping.patterns[j];
        let mut value = gain[i] * saturated_derivative(y_static[i], pattern.output);
        for (k, &e) in pattern.inputs.iter().enumerate() {
            value += saturated_derivative(x_static[(i, k)], e);
        }
        value
    });

    Ok(h * &mapping.assignment)
}
