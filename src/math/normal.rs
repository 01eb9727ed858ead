//! Weighted normal equations.
//!
//! The multi-objective sweep solves, for every weight column `w`:
//!
//! ```text
//! (Σ_o w_o A_oᵗ A_o) θ = Σ_o w_o A_oᵗ b_o
//! ```
//!
//! The per-objective blocks `A_oᵗ A_o` and `A_oᵗ b_o` do not depend on the
//! weights, so they are formed once ([`GramBlock`]) and only scaled and summed
//! per column ([`NormalEquations`]).

use nalgebra::{DMatrix, DVector};

/// `AᵗA` and `Aᵗb` for one regression problem.
#[derive(Debug, Clone)]
pub struct GramBlock {
    pub gram: DMatrix<f64>,
    pub cross: DVector<f64>,
}

impl GramBlock {
    /// Callers check that `a.nrows() == b.len()`.
    pub fn new(a: &DMatrix<f64>, b: &DVector<f64>) -> Self {
        Self {
            gram: a.tr_mul(a),
            cross: a.tr_mul(b),
        }
    }

    pub fn dim(&self) -> usize {
        self.cross.len()
    }
}

/// Running sum of weighted Gram blocks.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    lhs: DMatrix<f64>,
    rhs: DVector<f64>,
}

impl NormalEquations {
    pub fn new(dim: usize) -> Self {
        Self {
            lhs: DMatrix::zeros(dim, dim),
            rhs: DVector::zeros(dim),
        }
    }

    pub fn accumulate(&mut self, weight: f64, block: &GramBlock) {
        self.lhs += &block.gram * weight;
        self.rhs += &block.cross * weight;
    }

    pub fn lhs(&self) -> &DMatrix<f64> {
        &self.lhs
    }

    /// Solve by explicit inversion of the accumulated Gram matrix.
    ///
    /// Returns `None` when the matrix is singular. No regularization is applied.
    pub fn solve_by_inverse(&self) -> Option<DVector<f64>> {
        let inverse = self.lhs.clone().try_inverse()?;
        Some(inverse * &self.rhs)
    }
}

/// `(b - Aθ)ᵗ(b - Aθ)`.
pub fn residual_sum_of_squares(a: &DMatrix<f64>, b: &DVector<f64>, theta: &DVector<f64>) -> f64 {
    let r = b - a * theta;
    r.dot(&r)
}

/// Minimum-norm `min ‖b - Aθ‖²` through the SVD, used as the reference fit
/// the weighted sweep is checked against.
#[cfg(test)]
pub(crate) fn svd_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    a.clone().svd(true, true).solve(b, 1e-12).ok()
}
