//! Weight grid generation.
//!
//! The multi-objective problem is scalarized with a deterministic grid of
//! convex weights, one row per active objective, each column summing to 1.
//!
//! - 3 objectives: `w1` ascends from `start`, `w2` descends from 1, pairs with
//!   `w1 + w2 <= 1` are kept and `w3 = 1 - w1 - w2`.
//! - 2 objectives: `(w, 1 - w)` with `w` ascending from `start`.
//! - 1 objective: the single column `[1]`.

use nalgebra::DMatrix;

use crate::domain::{EstimationConfig, WeightSource};
use crate::error::{EstimationError, EstimationResult};

/// Default first grid coordinate. Starting above 0 avoids the all-zero weight.
pub const WEIGHT_START: f64 = 0.01;

/// Default grid increment.
pub const WEIGHT_STEP: f64 = 0.05;

/// Smallest accepted configured step. A three-objective grid has on the order
/// of `1 / step²` columns.
pub const MIN_WEIGHT_STEP: f64 = 1e-4;

/// Slack for the `w1 + w2 <= 1` feasibility test.
const FEASIBILITY_EPS: f64 = 1e-12;

/// Generate the grid for `active` objectives starting at [`WEIGHT_START`].
///
/// A step outside `(0, 1)` yields a grid with zero columns.
pub fn generate_weight_grid(step: f64, active: usize) -> DMatrix<f64> {
    weight_grid_from(WEIGHT_START, step, active)
}

/// Generate the grid with an explicit first coordinate.
pub fn weight_grid_from(start: f64, step: f64, active: usize) -> DMatrix<f64> {
    match active {
        1 => return DMatrix::from_element(1, 1, 1.0),
        2 | 3 => {}
        _ => {
            log::warn!("No weight grid for {active} active objectives.");
            return DMatrix::zeros(active, 0);
        }
    }
    if !(step > 0.0 && step < 1.0 && start > 0.0 && start < 1.0) {
        return DMatrix::zeros(active, 0);
    }

    let ascending: Vec<f64> = (0..)
        .map(|k| start + k as f64 * step)
        .take_while(|&w| w < 1.0)
        .collect();

    let mut data = Vec::new();
    if active == 2 {
        for &w in &ascending {
            data.extend_from_slice(&[w, 1.0 - w]);
        }
    } else {
        let descending: Vec<f64> = (0..)
            .map(|k| 1.0 - k as f64 * step)
            .take_while(|&w| w > start)
            .collect();
        for &w1 in &ascending {
            for &w2 in &descending {
                if w1 + w2 <= 1.0 + FEASIBILITY_EPS {
                    data.extend_from_slice(&[w1, w2, (1.0 - w1 - w2).max(0.0)]);
                }
            }
        }
    }

    let n = data.len() / active;
    DMatrix::from_column_slice(active, n, &data)
}

/// Pick the weight matrix for a run.
///
/// A caller-supplied matrix is used verbatim when its first column already
/// sums to 1; every column is then validated. Otherwise the grid is generated
/// from the configured start and step.
pub fn resolve_weights(
    source: &WeightSource,
    config: &EstimationConfig,
    active: usize,
) -> EstimationResult<DMatrix<f64>> {
    config.validate()?;
    let generated = || weight_grid_from(config.weight_start, config.weight_step, active);

    let WeightSource::Matrix(w) = source else {
        return Ok(generated());
    };

    let first_sum = if w.ncols() > 0 {
        w.column(0).sum()
    } else {
        f64::NAN
    };
    if (first_sum - 1.0).abs() <= config.weight_tolerance {
        validate_weights(w, active, config.weight_tolerance)?;
        return Ok(w.clone());
    }

    log::warn!(
        "Supplied weight matrix is not normalized (first column sums to {first_sum}); generating a grid with step {}.",
        config.weight_step
    );
    Ok(generated())
}

/// Check shape, sign and column sums of a weight matrix.
pub fn validate_weights(w: &DMatrix<f64>, active: usize, tolerance: f64) -> EstimationResult<()> {
    if w.nrows() != active {
        return Err(EstimationError::InvalidWeights(format!(
            "expected {active} rows (one per active objective), found {}",
            w.nrows()
        )));
    }
    for (c, column) in w.column_iter().enumerate() {
        if let Some(v) = column.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(EstimationError::InvalidWeights(format!(
                "column {c} has entry {v}; weights must be finite and non-negative"
            )));
        }
        let sum = column.sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(EstimationError::InvalidWeights(format!(
                "column {c} sums to {sum}, not 1"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_simplex(w: &DMatrix<f64>) {
        for column in w.column_iter() {
            assert!((column.sum() - 1.0).abs() < 1e-9);
            assert!(column.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn three_objective_grid_is_a_simplex() {
        let w = generate_weight_grid(WEIGHT_STEP, 3);
        assert_eq!(w.nrows(), 3);
        assert_eq!(w.ncols(), 190);
        assert_simplex(&w);
        assert!((w[(0, 0)] - 0.01).abs() < 1e-12);
        assert!((w[(1, 0)] - 0.95).abs() < 1e-12);
    }

    #[test]
    fn two_objective_grid_is_a_line() {
        let w = generate_weight_grid(WEIGHT_STEP, 2);
        assert_eq!(w.ncols(), 20);
        assert_simplex(&w);
        assert!((w[(0, 19)] - 0.96).abs() < 1e-12);
    }

    #[test]
    fn single_objective_is_one_point() {
        let w = generate_weight_grid(WEIGHT_STEP, 1);
        assert_eq!(w, DMatrix::from_element(1, 1, 1.0));
    }

    #[test]
    fn step_of_one_or_more_is_empty() {
        assert_eq!(generate_weight_grid(1.0, 3).ncols(), 0);
        assert_eq!(generate_weight_grid(2.5, 2).ncols(), 0);
        assert_eq!(generate_weight_grid(1.0, 2).nrows(), 2);
    }

    #[test]
    fn normalized_user_matrix_is_used_verbatim() {
        let config = EstimationConfig::default();
        let user = DMatrix::from_row_slice(3, 2, &[1.0, 0.2, 0.0, 0.3, 0.0, 0.5]);
        let w = resolve_weights(&WeightSource::Matrix(user.clone()), &config, 3).unwrap();
        assert_eq!(w, user);
    }

    #[test]
    fn unnormalized_user_matrix_is_regenerated() {
        let config = EstimationConfig::default();
        let user = DMatrix::from_row_slice(3, 1, &[0.0, 0.0, 0.0]);
        let w = resolve_weights(&WeightSource::Matrix(user), &config, 3).unwrap();
        assert_eq!(w.ncols(), 190);
    }

    #[test]
    fn tiny_configured_step_is_rejected_before_generation() {
        let config = EstimationConfig {
            weight_step: 1e-9,
            ..EstimationConfig::default()
        };
        let err = resolve_weights(&WeightSource::Grid, &config, 3).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidConfig(_)));
    }

    #[test]
    fn bad_later_column_is_rejected() {
        let config = EstimationConfig::default();
        let user = DMatrix::from_row_slice(2, 2, &[0.5, 0.7, 0.5, 0.7]);
        let err = resolve_weights(&WeightSource::Matrix(user), &config, 2).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidWeights(_)));

        let wrong_rows = DMatrix::from_row_slice(2, 1, &[0.5, 0.5]);
        let err = resolve_weights(&WeightSource::Matrix(wrong_rows), &config, 3).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidWeights(_)));
    }
}
