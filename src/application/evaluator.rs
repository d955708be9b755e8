//! Risk evaluator: Turns a patient record into a risk assessment.
//!
//! This service coordinates:
//! - Feature vector construction (fixed training order)
//! - Classifier invocation
//! - Output contract checks
//! - Verdict and gauge payload construction

use std::sync::Arc;

use crate::domain::{PatientRecord, RiskResult};
use crate::ports::RiskClassifier;
use crate::HeartwiseError;

/// Allowed deviation of `p_negative + p_positive` from 1.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Evaluate one record against `model`.
///
/// Pure apart from a log event: the same record and a deterministic model
/// always produce the same `RiskResult`.
///
/// # Errors
/// Returns `HeartwiseError::ModelContractViolation` if the model does not
/// return exactly two finite probabilities in [0, 1] summing to 1, and
/// `HeartwiseError::Classifier` if the model fails to score the row.
pub fn evaluate(
    record: &PatientRecord,
    model: &dyn RiskClassifier,
) -> Result<RiskResult, HeartwiseError> {
    let features = record.to_feature_vector();
    let probabilities = model.predict_proba(&features)?;
    let positive = positive_class_probability(&probabilities)?;

    let result = RiskResult::from_percentage(positive * 100.0);

    tracing::info!(
        model = model.name(),
        verdict = %result.verdict,
        probability = %result.percentage_label(),
        "Risk evaluation complete"
    );
    Ok(result)
}

/// Extract `p_positive` from a `[p_negative, p_positive]` pair.
fn positive_class_probability(probabilities: &[f64]) -> Result<f64, HeartwiseError> {
    let [negative, positive] = match probabilities {
        [n, p] => [*n, *p],
        other => {
            return Err(HeartwiseError::ModelContractViolation(format!(
                "expected 2 class probabilities, got {}",
                other.len()
            )))
        }
    };

    let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
    if !in_unit(negative) || !in_unit(positive) {
        return Err(HeartwiseError::ModelContractViolation(format!(
            "probabilities must lie in [0, 1], got [{negative}, {positive}]"
        )));
    }
    if (negative + positive - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(HeartwiseError::ModelContractViolation(format!(
            "probabilities must sum to 1, got {}",
            negative + positive
        )));
    }
    Ok(positive)
}

/// Evaluator holding the injected model.
///
/// Cheap to clone; the model is shared read-only.
#[derive(Clone)]
pub struct RiskEvaluator {
    model: Arc<dyn RiskClassifier>,
}

impl RiskEvaluator {
    pub fn new(model: Arc<dyn RiskClassifier>) -> Self {
        Self { model }
    }

    /// Name of the injected model.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// # Errors
    /// See [`evaluate`].
    pub fn evaluate(&self, record: &PatientRecord) -> Result<RiskResult, HeartwiseError> {
        evaluate(record, self.model.as_ref())
    }
}
