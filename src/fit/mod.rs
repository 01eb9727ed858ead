//! Multi-objective fitting.
//!
//! Responsibilities:
//!
//! - generate or validate the weight grid
//! - describe the active objectives and their row orders
//! - solve every weight column (parallel) and build the trade-off front

pub mod multiobjective;
pub mod objectives;
pub mod weight_grid;

pub use multiobjective::*;
pub use objectives::*;
pub use weight_grid::*;
