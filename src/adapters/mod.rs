//! Adapters layer: Concrete implementations of ports.
//!
//! - `model`: JSON model artifacts (logistic regression, random forest)

pub mod model;

pub use model::{JsonModelClassifier, ModelLoadError};
