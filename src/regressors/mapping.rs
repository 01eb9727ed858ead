//! Mapping candidate exponent patterns onto the selected model.
//!
//! The static regressors are built in "pattern space" (one column per distinct
//! exponent pattern that occurs in the selected model). The assignment matrix
//! `R` projects pattern-space columns onto the selected model's columns, so
//! `Q * R` lines up column-for-column with the dynamic regression matrix `Ψ`.

use std::collections::HashMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{EstimationError, EstimationResult};
use crate::regressors::term::{ExponentPattern, Term};

/// Assignment matrix `R` plus the retained exponent table `Q_exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorMapping {
    /// Retained patterns; row `i` of `assignment` belongs to `patterns[i]`.
    pub patterns: Vec<ExponentPattern>,
    /// `R`, shape `(patterns.len(), n_selected)`, exactly one `1` per column.
    pub assignment: DMatrix<f64>,
    /// For each retained pattern, the selected-model column it maps onto.
    pub columns: Vec<usize>,
}

impl RegressorMapping {
    pub fn n_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn n_selected(&self) -> usize {
        self.assignment.ncols()
    }

    pub fn n_inputs(&self) -> usize {
        self.patterns.first().map_or(0, ExponentPattern::n_inputs)
    }
}

/// Build `R` and `Q_exp` from structural regressors.
///
/// Candidate rows whose pattern does not occur in `selected` are not emitted.
/// Candidates repeating an earlier pattern (same exponents, other lags) are
/// collapsed onto the first occurrence.
pub fn map_regressors(candidates: &[Term], selected: &[Term]) -> EstimationResult<RegressorMapping> {
    let n_inputs = candidates
        .first()
        .or_else(|| selected.first())
        .map_or(0, Term::n_inputs);
    check_slots(candidates, n_inputs, "candidate space")?;
    check_slots(selected, n_inputs, "selected model")?;

    let mut column_of: HashMap<&ExponentPattern, usize> = HashMap::with_capacity(selected.len());
    for (j, term) in selected.iter().enumerate() {
        if let Some(&first) = column_of.get(term.pattern()) {
            return Err(EstimationError::DuplicatePattern {
                pattern: term.pattern().to_string(),
                first,
                second: j,
            });
        }
        column_of.insert(term.pattern(), j);
    }

    let mut patterns = Vec::with_capacity(selected.len());
    let mut columns = Vec::with_capacity(selected.len());
    let mut matched = vec![false; selected.len()];
    for term in candidates {
        let Some(&j) = column_of.get(term.pattern()) else {
            continue;
        };
        if matched[j] {
            continue;
        }
        matched[j] = true;
        patterns.push(term.pattern().clone());
        columns.push(j);
    }

    if patterns.is_empty() {
        return Err(EstimationError::EmptyMapping {
            candidates: candidates.len(),
            selected: selected.len(),
        });
    }
    if let Some(index) = matched.iter().position(|&m| !m) {
        return Err(EstimationError::UnmappedRegressor {
            index,
            term: selected[index].to_string(),
        });
    }

    let mut assignment = DMatrix::<f64>::zeros(patterns.len(), selected.len());
    for (i, &j) in columns.iter().enumerate() {
        assignment[(i, j)] = 1.0;
    }

    log::debug!(
        "Regressor mapping retained {} of {} candidate patterns for {} selected regressors.",
        patterns.len(),
        candidates.len(),
        selected.len()
    );

    Ok(RegressorMapping {
        patterns,
        assignment,
        columns,
    })
}

/// [`map_regressors`] over packed code rows.
///
/// Every row in both inputs must have the same width (the degree of the
/// candidate space).
pub fn map_regressors_from_codes(
    candidate_codes: &[Vec<u32>],
    selected_codes: &[Vec<u32>],
    n_inputs: usize,
    scale_factor: u32,
) -> EstimationResult<RegressorMapping> {
    let width = candidate_codes.first().map_or(0, Vec::len);
    let decode = |rows: &[Vec<u32>], context: &str| -> EstimationResult<Vec<Term>> {
        rows.iter()
            .map(|row| {
                if row.len() != width {
                    return Err(EstimationError::ShapeMismatch {
                        expected: width,
                        found: row.len(),
                        context: format!("{context} code row"),
                    });
                }
                Term::from_codes(row, n_inputs, scale_factor)
            })
            .collect()
    };

    let candidates = decode(candidate_codes, "candidate space")?;
    let selected = decode(selected_codes, "selected model")?;
    map_regressors(&candidates, &selected)
}

fn check_slots(terms: &[Term], n_inputs: usize, context: &str) -> EstimationResult<()> {
    match terms.iter().find(|t| t.n_inputs() != n_inputs) {
        Some(term) => Err(EstimationError::ShapeMismatch {
            expected: n_inputs,
            found: term.n_inputs(),
            context: format!("{context} term {term}"),
        }),
        None => Ok(()),
    }
}
