//! Active objective descriptors.
//!
//! Each active objective carries its regression matrix, its target, the weight
//! row that scales it and the residual row it reports into. The two orders
//! differ:
//!
//! - weight rows: dynamic, static function, static gain
//! - residual rows: dynamic, static gain, static function

use nalgebra::{DMatrix, DVector};

use crate::domain::Objective;
use crate::error::{EstimationError, EstimationResult};

const WEIGHT_ORDER: [Objective; 3] = [
    Objective::Dynamic,
    Objective::StaticFunction,
    Objective::StaticGain,
];

const RESIDUAL_ORDER: [Objective; 3] = [
    Objective::Dynamic,
    Objective::StaticGain,
    Objective::StaticFunction,
];

/// A regression matrix and the target it is fitted against.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveData<'a> {
    pub regressors: &'a DMatrix<f64>,
    pub target: &'a DVector<f64>,
}

impl<'a> ObjectiveData<'a> {
    pub fn new(regressors: &'a DMatrix<f64>, target: &'a DVector<f64>) -> Self {
        Self { regressors, target }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActiveObjective<'a> {
    pub objective: Objective,
    pub data: ObjectiveData<'a>,
    pub weight_row: usize,
    pub residual_row: usize,
}

/// The active objectives of one estimation, in weight-row order.
#[derive(Debug, Clone)]
pub struct ObjectiveSet<'a> {
    active: Vec<ActiveObjective<'a>>,
    n_params: usize,
}

impl<'a> ObjectiveSet<'a> {
    pub fn new(
        dynamic: ObjectiveData<'a>,
        static_function: Option<ObjectiveData<'a>>,
        static_gain: Option<ObjectiveData<'a>>,
    ) -> EstimationResult<Self> {
        let n_params = dynamic.regressors.ncols();
        let lookup = |objective: Objective| match objective {
            Objective::Dynamic => Some(dynamic),
            Objective::StaticFunction => static_function,
            Objective::StaticGain => static_gain,
        };

        let residual_objectives: Vec<Objective> = RESIDUAL_ORDER
            .into_iter()
            .filter(|&o| lookup(o).is_some())
            .collect();

        let mut active = Vec::with_capacity(residual_objectives.len());
        for objective in WEIGHT_ORDER {
            let Some(data) = lookup(objective) else {
                continue;
            };
            check_data(objective, &data, n_params)?;
            let residual_row = residual_objectives
                .iter()
                .position(|&o| o == objective)
                .unwrap_or_default();
            let weight_row = active.len();
            active.push(ActiveObjective {
                objective,
                data,
                weight_row,
                residual_row,
            });
        }

        Ok(Self { active, n_params })
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn n_params(&self) -> usize {
        self.n_params
    }

    /// Objectives in weight-row order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveObjective<'a>> {
        self.active.iter()
    }

    /// Row labels of the residual matrix.
    pub fn residual_labels(&self) -> Vec<Objective> {
        let mut labels = vec![Objective::Dynamic; self.active.len()];
        for a in &self.active {
            labels[a.residual_row] = a.objective;
        }
        labels
    }
}

fn check_data(objective: Objective, data: &ObjectiveData<'_>, n_params: usize) -> EstimationResult<()> {
    if data.regressors.nrows() != data.target.len() {
        return Err(EstimationError::dimension(
            format!("{objective} target samples"),
            data.regressors.nrows(),
            data.target.len(),
        ));
    }
    if data.regressors.ncols() != n_params {
        return Err(EstimationError::dimension(
            format!("{objective} regressor columns"),
            n_params,
            data.regressors.ncols(),
        ));
    }
    Ok(())
}
