//! Classifier port: Trait for the pre-trained heart-disease model.
//!
//! This trait abstracts the model artifact format from the evaluator, so the
//! evaluator can be driven by a loaded model or a test stub.

use crate::domain::FeatureVector;

/// Error raised inside a classifier while producing probabilities.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Binary classifier capability.
///
/// Implementations are loaded once at startup and never mutated afterwards,
/// so they must be shareable across threads.
pub trait RiskClassifier: Send + Sync {
    /// Predict class probabilities for a single feature row.
    ///
    /// A conforming model returns exactly two probabilities,
    /// `[p_negative, p_positive]`, summing to 1. Callers must not assume
    /// conformance; the evaluator checks the shape.
    ///
    /// # Errors
    /// Returns `ClassifierError` if the model cannot score the row.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;

    /// Short model description for logs and the UI header.
    fn name(&self) -> &str;
}

impl<T: RiskClassifier + ?Sized> RiskClassifier for std::sync::Arc<T> {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        (**self).predict_proba(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
