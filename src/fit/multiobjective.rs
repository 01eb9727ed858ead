//! Multi-objective weighted least squares sweep.
//!
//! For every weight column `w` we solve
//!
//! ```text
//! (Σ_o w_o A_oᵗ A_o) θ = Σ_o w_o A_oᵗ b_o
//! ```
//!
//! by inverting the combined Gram matrix, then record `‖b_o - A_o θ‖²` for each
//! active objective. Columns are independent and solved in parallel; results
//! are written back in column order.
//!
//! After the sweep the residual matrix `J` is divided by its largest finite
//! entry and each column's Euclidean norm becomes its score `E`.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{FailurePolicy, ParetoFront};
use crate::error::{EstimationError, EstimationResult};
use crate::fit::objectives::ObjectiveSet;
use crate::fit::weight_grid::validate_weights;
use crate::math::{GramBlock, NormalEquations, residual_sum_of_squares};

#[derive(Debug, Clone)]
struct ColumnSolution {
    theta: DVector<f64>,
    /// In residual-row order.
    residuals: Vec<f64>,
}

/// Solve every weight column and assemble the trade-off front.
///
/// `weights` needs one row per active objective, in weight-row order. Every
/// column must be non-negative and sum to 1 within `tolerance`.
pub fn solve_multiobjective(
    objectives: &ObjectiveSet<'_>,
    weights: &DMatrix<f64>,
    policy: FailurePolicy,
    tolerance: f64,
) -> EstimationResult<ParetoFront> {
    if weights.nrows() != objectives.len() {
        return Err(EstimationError::dimension(
            "weight matrix rows",
            objectives.len(),
            weights.nrows(),
        ));
    }
    validate_weights(weights, objectives.len(), tolerance)?;

    let n_points = weights.ncols();
    let n_params = objectives.n_params();
    let n_objectives = objectives.len();

    log::info!(
        "Solving {n_points} weight points for {n_params} parameters over {n_objectives} objectives."
    );

    // The blocks are weight independent; form them once.
    let blocks: Vec<GramBlock> = objectives
        .iter()
        .map(|a| GramBlock::new(a.data.regressors, a.data.target))
        .collect();

    let solutions: Vec<EstimationResult<ColumnSolution>> = (0..n_points)
        .into_par_iter()
        .map(|column| solve_column(objectives, &blocks, weights, column))
        .collect();

    let mut raw = DMatrix::<f64>::zeros(n_objectives, n_points);
    let mut thetas = DMatrix::<f64>::zeros(n_points, n_params);
    let mut failed_columns = Vec::new();

    for (column, solution) in solutions.into_iter().enumerate() {
        match solution {
            Ok(s) => {
                thetas.set_row(column, &s.theta.transpose());
                for (row, &r) in s.residuals.iter().enumerate() {
                    raw[(row, column)] = r;
                }
            }
            Err(err) => match policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::SkipColumn => {
                    log::warn!("Skipping weight column {column}: {err}");
                    thetas.row_mut(column).fill(f64::NAN);
                    raw.column_mut(column).fill(f64::NAN);
                    failed_columns.push(column);
                }
            },
        }
    }

    let residuals = normalize_by_global_max(&raw);
    let scores = column_norms(&residuals);

    log::info!(
        "Multi-objective sweep finished: {} of {n_points} weight points solved.",
        n_points - failed_columns.len()
    );

    Ok(ParetoFront {
        objectives: objectives.residual_labels(),
        residuals,
        raw_residuals: raw,
        weights: weights.clone(),
        scores,
        thetas,
        failed_columns,
    })
}

fn solve_column(
    objectives: &ObjectiveSet<'_>,
    blocks: &[GramBlock],
    weights: &DMatrix<f64>,
    column: usize,
) -> EstimationResult<ColumnSolution> {
    let mut system = NormalEquations::new(objectives.n_params());
    for (active, block) in objectives.iter().zip(blocks) {
        system.accumulate(weights[(active.weight_row, column)], block);
    }

    let theta = system
        .solve_by_inverse()
        .ok_or(EstimationError::SingularSystem { column })?;
    if theta.iter().any(|v| !v.is_finite()) {
        return Err(EstimationError::NonFiniteSolution { column });
    }

    let mut residuals = vec![0.0; objectives.len()];
    for active in objectives.iter() {
        residuals[active.residual_row] =
            residual_sum_of_squares(active.data.regressors, active.data.target, &theta);
    }
    if residuals.iter().any(|r| !r.is_finite()) {
        return Err(EstimationError::NonFiniteSolution { column });
    }

    Ok(ColumnSolution { theta, residuals })
}

/// Divide by the largest finite entry. Left unscaled when that maximum is not
/// positive (every objective fitted exactly, or no finite entries).
fn normalize_by_global_max(raw: &DMatrix<f64>) -> DMatrix<f64> {
    let max = raw
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if max > 0.0 {
        raw / max
    } else {
        if !raw.is_empty() {
            log::warn!("Residual matrix has no positive finite maximum ({max}); returning it unscaled.");
        }
        raw.clone()
    }
}

fn column_norms(j: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(j.ncols(), j.column_iter().map(|c| c.norm()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Objective;
    use crate::fit::objectives::ObjectiveData;
    use crate::fit::weight_grid::generate_weight_grid;
    use crate::math::normal::svd_least_squares;

    const TOL: f64 = 1e-9;

    struct Fixture {
        psi: DMatrix<f64>,
        y: DVector<f64>,
        qr: DMatrix<f64>,
        ys: DVector<f64>,
        hr: DMatrix<f64>,
        gain: DVector<f64>,
    }

    fn fixture() -> Fixture {
        let psi = DMatrix::from_row_slice(
            6,
            2,
            &[0.1, 1.0, 0.4, 0.5, 0.9, -0.3, 1.3, 0.8, 1.7, -1.0, 2.2, 0.2],
        );
        let y = DVector::from_row_slice(&[0.8, 0.7, 0.2, 1.5, 0.1, 1.4]);
        let qr = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 4.0, 2.0, 9.0, 3.0]);
        let ys = DVector::from_row_slice(&[1.1, 4.5, 8.7]);
        let hr = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 4.0, 1.0, 6.0, 1.0]);
        let gain = DVector::from_row_slice(&[2.0, 4.0, 6.0]);
        Fixture {
            psi,
            y,
            qr,
            ys,
            hr,
            gain,
        }
    }

    fn full_set(f: &Fixture) -> ObjectiveSet<'_> {
        ObjectiveSet::new(
            ObjectiveData::new(&f.psi, &f.y),
            Some(ObjectiveData::new(&f.qr, &f.ys)),
            Some(ObjectiveData::new(&f.hr, &f.gain)),
        )
        .unwrap()
    }

    #[test]
    fn dynamic_only_matches_ordinary_least_squares() {
        let f = fixture();
        let set = ObjectiveSet::new(ObjectiveData::new(&f.psi, &f.y), None, None).unwrap();
        let w = generate_weight_grid(0.05, 1);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();

        let reference = svd_least_squares(&f.psi, &f.y).unwrap();
        let theta = front.theta(0).unwrap();
        assert!((&theta - &reference).amax() < 1e-10);
        assert_eq!(front.objectives, vec![Objective::Dynamic]);
        assert_eq!(front.residuals[(0, 0)], 1.0);
    }

    #[test]
    fn pure_dynamic_weight_column_matches_ordinary_least_squares() {
        let f = fixture();
        let set = full_set(&f);
        let w = DMatrix::from_column_slice(3, 1, &[1.0, 0.0, 0.0]);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();

        let reference = svd_least_squares(&f.psi, &f.y).unwrap();
        assert!((front.theta(0).unwrap() - reference).amax() < 1e-10);
    }

    #[test]
    fn normalized_residuals_are_bounded_with_a_unit_maximum() {
        let f = fixture();
        let set = full_set(&f);
        let w = generate_weight_grid(0.05, 3);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();

        assert_eq!(front.len(), 190);
        assert_eq!(front.thetas.nrows(), 190);
        assert!(front.residuals.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(front.residuals.iter().any(|&v| v == 1.0));
        for (i, column) in front.residuals.column_iter().enumerate() {
            assert!((front.scores[i] - column.norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn residual_rows_follow_dynamic_gain_function_order() {
        let f = fixture();
        let set = full_set(&f);
        let w = DMatrix::from_column_slice(3, 1, &[0.2, 0.5, 0.3]);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();

        let theta = front.theta(0).unwrap();
        let gain_rss = residual_sum_of_squares(&f.hr, &f.gain, &theta);
        let function_rss = residual_sum_of_squares(&f.qr, &f.ys, &theta);
        assert!((front.raw_residuals[(1, 0)] - gain_rss).abs() < 1e-10);
        assert!((front.raw_residuals[(2, 0)] - function_rss).abs() < 1e-10);
        assert_eq!(front.objective_row(Objective::StaticGain), Some(1));
    }

    #[test]
    fn heavier_static_weight_lowers_static_residual() {
        let f = fixture();
        let set = ObjectiveSet::new(
            ObjectiveData::new(&f.psi, &f.y),
            Some(ObjectiveData::new(&f.qr, &f.ys)),
            None,
        )
        .unwrap();
        let w = DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.1, 0.9]);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();

        assert!(front.raw_residuals[(1, 1)] <= front.raw_residuals[(1, 0)]);
        assert!(front.raw_residuals[(0, 1)] >= front.raw_residuals[(0, 0)]);
    }

    #[test]
    fn singular_column_aborts_or_is_skipped() {
        let f = fixture();
        // Collinear columns: Ψᵗ Ψ alone is singular, QR restores full rank.
        let psi = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.5]);
        let set = ObjectiveSet::new(
            ObjectiveData::new(&psi, &y),
            Some(ObjectiveData::new(&f.qr, &f.ys)),
            None,
        )
        .unwrap();
        // Column 1 puts all weight on the dynamic objective.
        let w = DMatrix::from_row_slice(2, 3, &[0.5, 1.0, 0.3, 0.5, 0.0, 0.7]);

        let err = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap_err();
        assert_eq!(err, EstimationError::SingularSystem { column: 1 });

        let front = solve_multiobjective(&set, &w, FailurePolicy::SkipColumn, TOL).unwrap();
        assert_eq!(front.failed_columns, vec![1]);
        assert!(front.thetas.row(1).iter().all(|v| v.is_nan()));
        assert!(front.scores[1].is_nan());
        assert!(front.scores[0].is_finite() && front.scores[2].is_finite());
        assert_ne!(front.best_index(), Some(1));
    }

    #[test]
    fn unnormalized_or_negative_weights_are_rejected() {
        let f = fixture();
        let set = ObjectiveSet::new(
            ObjectiveData::new(&f.psi, &f.y),
            Some(ObjectiveData::new(&f.qr, &f.ys)),
            None,
        )
        .unwrap();

        let w = DMatrix::from_row_slice(2, 2, &[5.0, -3.0, 7.0, 0.5]);
        let err = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidWeights(_)));

        let zero = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.5, 0.0]);
        let err = solve_multiobjective(&set, &zero, FailurePolicy::SkipColumn, TOL).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidWeights(_)));
    }

    #[test]
    fn weight_rows_must_match_objectives() {
        let f = fixture();
        let set = full_set(&f);
        let w = generate_weight_grid(0.05, 2);
        let err = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap_err();
        assert_eq!(err, EstimationError::dimension("weight matrix rows", 3, 2));
    }

    #[test]
    fn empty_grid_gives_empty_front() {
        let f = fixture();
        let set = full_set(&f);
        let w = generate_weight_grid(1.0, 3);
        let front = solve_multiobjective(&set, &w, FailurePolicy::Abort, TOL).unwrap();
        assert!(front.is_empty());
        assert_eq!(front.residuals.shape(), (3, 0));
        assert_eq!(front.best_index(), None);
    }
}
