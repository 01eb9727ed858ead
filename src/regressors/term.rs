//! Structural representation of polynomial regressors.
//!
//! A regressor is a product of lagged output/input values, e.g.
//! `y(k-1) * x1(k-2)`. For steady-state analysis only the exponent of each
//! variable matters: at an operating point every lag of `y` takes the same
//! value, so `y(k-1)` and `y(k-2)` reduce to the same [`ExponentPattern`].
//!
//! Structure selectors commonly hand regressors over in a packed integer form:
//! each degree slot holds `variable * scale_factor + lag`, where variable `0`
//! is the constant slot, `1` the output and `2 + k` input `k`.
//! [`Term::from_codes`] decodes that form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EstimationError, EstimationResult};

/// Per-variable exponents of a regressor, lag information discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExponentPattern {
    /// Exponent of the output `y`.
    pub output: u32,
    /// Exponent of each input, indexed by input number.
    pub inputs: Vec<u32>,
}

impl ExponentPattern {
    pub fn constant(n_inputs: usize) -> Self {
        Self {
            output: 0,
            inputs: vec![0; n_inputs],
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Total degree of the monomial.
    pub fn degree(&self) -> u32 {
        self.output + self.inputs.iter().sum::<u32>()
    }

    pub fn is_constant(&self) -> bool {
        self.degree() == 0
    }
}

impl fmt::Display for ExponentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write!(f, "1");
        }
        let mut parts = Vec::new();
        if self.output > 0 {
            parts.push(format!("y^{}", self.output));
        }
        for (k, &e) in self.inputs.iter().enumerate() {
            if e > 0 {
                parts.push(format!("x{}^{}", k + 1, e));
            }
        }
        write!(f, "{}", parts.join("*"))
    }
}

/// A model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Output,
    /// Zero-based input index.
    Input(usize),
}

/// One lagged variable inside a regressor product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Factor {
    pub variable: Variable,
    pub lag: u32,
}

impl Factor {
    pub fn output(lag: u32) -> Self {
        Self {
            variable: Variable::Output,
            lag,
        }
    }

    pub fn input(index: usize, lag: u32) -> Self {
        Self {
            variable: Variable::Input(index),
            lag,
        }
    }
}

/// A polynomial regressor: its lagged factors plus the derived exponent pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    factors: Vec<Factor>,
    pattern: ExponentPattern,
}

impl Term {
    /// Build a term from its factors. An empty factor list is the constant term.
    pub fn new(n_inputs: usize, factors: impl IntoIterator<Item = Factor>) -> EstimationResult<Self> {
        let mut factors: Vec<Factor> = factors.into_iter().collect();
        factors.sort_by_key(|f| (variable_rank(f.variable), f.lag));

        let mut pattern = ExponentPattern::constant(n_inputs);
        for factor in &factors {
            match factor.variable {
                Variable::Output => pattern.output += 1,
                Variable::Input(k) => {
                    let Some(e) = pattern.inputs.get_mut(k) else {
                        return Err(EstimationError::ShapeMismatch {
                            expected: n_inputs,
                            found: k + 1,
                            context: format!("factor refers to input x{}", k + 1),
                        });
                    };
                    *e += 1;
                }
            }
        }

        Ok(Self { factors, pattern })
    }

    pub fn constant(n_inputs: usize) -> Self {
        Self {
            factors: Vec::new(),
            pattern: ExponentPattern::constant(n_inputs),
        }
    }

    /// Decode one row of packed regressor codes.
    pub fn from_codes(codes: &[u32], n_inputs: usize, scale_factor: u32) -> EstimationResult<Self> {
        if scale_factor < 2 {
            return Err(EstimationError::InvalidConfig(format!(
                "scale factor must be >= 2, got {scale_factor}"
            )));
        }

        let mut factors = Vec::with_capacity(codes.len());
        for &code in codes {
            let variable = code / scale_factor;
            let lag = code % scale_factor;
            match variable {
                0 => {}
                1 => factors.push(Factor::output(lag)),
                v => {
                    let input = (v - 2) as usize;
                    if input >= n_inputs {
                        return Err(EstimationError::UnknownVariable {
                            code,
                            input,
                            n_inputs,
                        });
                    }
                    factors.push(Factor::input(input, lag));
                }
            }
        }

        Self::new(n_inputs, factors)
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn pattern(&self) -> &ExponentPattern {
        &self.pattern
    }

    pub fn n_inputs(&self) -> usize {
        self.pattern.n_inputs()
    }

    /// Largest lag among the factors (0 for the constant term).
    pub fn max_lag(&self) -> u32 {
        self.factors.iter().map(|f| f.lag).max().unwrap_or(0)
    }
}

fn variable_rank(variable: Variable) -> usize {
    match variable {
        Variable::Output => 0,
        Variable::Input(k) => k + 1,
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "1");
        }
        for factor in &self.factors {
            match factor.variable {
                Variable::Output => write!(f, "y(k-{})", factor.lag)?,
                Variable::Input(k) => write!(f, "x{}(k-{})", k + 1, factor.lag)?,
            }
        }
        Ok(())
    }
}
