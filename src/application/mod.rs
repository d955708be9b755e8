//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the risk evaluation use case.

mod evaluator;

pub use evaluator::{evaluate, RiskEvaluator};
