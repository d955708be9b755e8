//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary between
//! the application and the model artifact.

mod classifier;

pub use classifier::{ClassifierError, RiskClassifier};
