//! Static function regression matrix `QR`.

use nalgebra::{DMatrix, DVector};

use crate::error::EstimationResult;
use crate::math::power;
use crate::regressors::RegressorMapping;
use crate::steady_state::check_static_inputs;

/// Build `QR`, shape `(n_samples, n_selected)`.
///
/// `Q[i, j] = Y[i]^e_y(j) · Π_k X[i, k]^e_k(j)` for retained pattern `j`.
pub fn build_static_function_matrix(
    mapping: &RegressorMapping,
    y_static: &DVector<f64>,
    x_static: &DMatrix<f64>,
    n_inputs: usize,
) -> EstimationResult<DMatrix<f64>> {
    check_static_inputs(mapping, y_static, x_static, n_inputs)?;

    let q = DMatrix::from_fn(y_static.len(), mapping.n_patterns(), |i, j| {
        let pattern = &mapping.patterns[j];
        let mut value = power(y_static[i], pattern.output);
        for (k, &e) in pattern.inputs.iter().enumerate() {
            value *= power(x_static[(i, k)], e);
        }
        value
    });

    Ok(q * &mapping.assignment)
}
