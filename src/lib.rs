//! # Heartwise
//!
//! Heart-disease risk assessment from thirteen clinical measurements.
//!
//! This crate provides:
//! - Validated patient records and a fixed-order feature vector
//! - A loader for pre-trained classifier artifacts
//! - A risk evaluator producing a verdict and gauge payload
//! - Terminal UI for local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (PatientRecord, RiskResult)
//! - `ports`: Trait definitions for external operations (RiskClassifier)
//! - `adapters`: Concrete implementations (JSON model artifacts)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{evaluate, RiskEvaluator};
pub use domain::{PatientRecord, RiskResult, RiskVerdict};
pub use ports::RiskClassifier;

/// Result type for Heartwise operations
pub type Result<T> = std::result::Result<T, HeartwiseError>;

/// Main error type for Heartwise
#[derive(Debug, thiserror::Error)]
pub enum HeartwiseError {
    /// The model could not be loaded. Fatal at startup.
    #[error("Startup failure: {0}")]
    StartupFailure(#[from] adapters::ModelLoadError),

    /// The model's output does not match the two-probability contract.
    #[error("Model contract violation: {0}")]
    ModelContractViolation(String),

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ports::ClassifierError),

    #[error("Invalid patient data: {0}")]
    Field(#[from] domain::FieldError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
