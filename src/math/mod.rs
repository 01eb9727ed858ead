//! Mathematical utilities: monomial evaluation and weighted normal equations.

pub mod monomial;
pub mod normal;

pub use monomial::*;
pub use normal::*;
