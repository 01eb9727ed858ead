//! Domain types used throughout the estimation pipeline.
//!
//! This module defines:
//!
//! - configuration (`EstimationConfig`, `ModelType`, `FailurePolicy`)
//! - inputs (`DynamicModel`, `StaticData`, `WeightSource`)
//! - outputs (`ParetoFront`, `Objective`)

pub mod types;

pub use types::*;
