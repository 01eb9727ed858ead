//! Regressor representation and candidate-to-model mapping.

pub mod mapping;
pub mod space;
pub mod term;

pub use mapping::*;
pub use space::*;
pub use term::*;
