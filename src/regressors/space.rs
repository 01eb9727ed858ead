//! Candidate regressor spaces.
//!
//! The candidate space is every regressor a structure selector could have
//! chosen for a given degree and input count. Selectors with their own
//! enumeration implement [`CandidateSpace`]; [`MonomialSpace`] covers the
//! common case of lag-1 polynomial terms.

use itertools::Itertools;

use crate::domain::ModelType;
use crate::error::EstimationResult;
use crate::regressors::term::{Factor, Term};

/// Source of candidate regressors.
pub trait CandidateSpace {
    fn candidates(&self, degree: usize, n_inputs: usize) -> EstimationResult<Vec<Term>>;
}

/// All polynomial terms of total degree `<= degree` over lag-1 variables.
///
/// Ordering: the constant first, then combinations with replacement of
/// `[constant, y, x1, x2, ...]` over `degree` slots in lexicographic order.
#[derive(Debug, Clone, Copy)]
pub struct MonomialSpace {
    pub model_type: ModelType,
}

impl MonomialSpace {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}

impl CandidateSpace for MonomialSpace {
    fn candidates(&self, degree: usize, n_inputs: usize) -> EstimationResult<Vec<Term>> {
        // `None` is the constant slot.
        let mut slots: Vec<Option<Factor>> = vec![None];
        if self.model_type.has_output_terms() {
            slots.push(Some(Factor::output(1)));
        }
        if self.model_type.has_input_terms() {
            slots.extend((0..n_inputs).map(|k| Some(Factor::input(k, 1))));
        }

        (0..slots.len())
            .combinations_with_replacement(degree)
            .map(|combo| Term::new(n_inputs, combo.into_iter().filter_map(|i| slots[i])))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressors::term::ExponentPattern;

    fn patterns(terms: &[Term]) -> Vec<ExponentPattern> {
        terms.iter().map(|t| t.pattern().clone()).collect()
    }

    #[test]
    fn narmax_degree_two_single_input() {
        let terms = MonomialSpace::new(ModelType::Narmax).candidates(2, 1).unwrap();
        let p = |output, x| ExponentPattern {
            output,
            inputs: vec![x],
        };
        assert_eq!(
            patterns(&terms),
            vec![p(0, 0), p(1, 0), p(0, 1), p(2, 0), p(1, 1), p(0, 2)]
        );
    }

    #[test]
    fn nfir_has_no_output_terms() {
        let terms = MonomialSpace::new(ModelType::Nfir).candidates(2, 2).unwrap();
        assert_eq!(terms.len(), 6);
        assert!(terms.iter().all(|t| t.pattern().output == 0));
    }

    #[test]
    fn nar_has_no_input_terms() {
        let terms = MonomialSpace::new(ModelType::Nar).candidates(3, 2).unwrap();
        assert_eq!(terms.len(), 4);
        assert!(terms.iter().all(|t| t.pattern().inputs == vec![0, 0]));
    }

    #[test]
    fn candidate_count_matches_binomial() {
        // C(n_vars + degree, degree) with n_vars = 1 + n_inputs.
        let terms = MonomialSpace::new(ModelType::Narmax).candidates(3, 2).unwrap();
        assert_eq!(terms.len(), 20);
    }
}
