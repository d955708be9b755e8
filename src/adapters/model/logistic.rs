//! Logistic regression with an optional standard scaler.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, FEATURE_COUNT};

use super::ModelLoadError;

/// Per-feature standardization applied before the linear term:
/// `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    pub(super) fn validate(&self) -> Result<(), ModelLoadError> {
        check_len("coefficients", self.coefficients.len())?;
        if !self.coefficients.iter().all(|c| c.is_finite()) || !self.intercept.is_finite() {
            return Err(ModelLoadError::InvalidParameters(
                "coefficients and intercept must be finite".into(),
            ));
        }

        if let Some(scaler) = &self.scaler {
            check_len("scaler.mean", scaler.mean.len())?;
            check_len("scaler.scale", scaler.scale.len())?;
            if !scaler.mean.iter().all(|m| m.is_finite()) {
                return Err(ModelLoadError::InvalidParameters(
                    "scaler.mean must be finite".into(),
                ));
            }
            if let Some(i) = scaler.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
                return Err(ModelLoadError::InvalidParameters(format!(
                    "scaler.scale[{i}] must be finite and non-zero"
                )));
            }
        }
        Ok(())
    }

    /// Positive-class probability.
    pub(super) fn positive_probability(&self, x: &FeatureVector) -> f64 {
        let z = x
            .iter()
            .enumerate()
            .map(|(i, &raw)| {
                let value = match &self.scaler {
                    Some(s) => (raw - s.mean[i]) / s.scale[i],
                    None => raw,
                };
                self.coefficients[i] * value
            })
            .sum::<f64>()
            + self.intercept;

        sigmoid(z)
    }
}

fn check_len(what: &str, len: usize) -> Result<(), ModelLoadError> {
    if len != FEATURE_COUNT {
        return Err(ModelLoadError::InvalidParameters(format!(
            "{what} has {len} entries, expected {FEATURE_COUNT}"
        )));
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_model(intercept: f64) -> LogisticRegression {
        LogisticRegression {
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept,
            scaler: None,
        }
    }

    #[test]
    fn test_intercept_only() {
        let x = [0.0; FEATURE_COUNT];
        assert!((zero_model(0.0).positive_probability(&x) - 0.5).abs() < 1e-12);
        assert!(zero_model(4.0).positive_probability(&x) > 0.98);
        assert!(zero_model(-4.0).positive_probability(&x) < 0.02);
    }

    #[test]
    fn test_scaler_applied() {
        let mut model = zero_model(0.0);
        model.coefficients[0] = 1.0;
        model.scaler = Some(StandardScaler {
            mean: vec![50.0; FEATURE_COUNT],
            scale: vec![10.0; FEATURE_COUNT],
        });

        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 50.0;
        assert!((model.positive_probability(&x) - 0.5).abs() < 1e-12);

        // z = (60 - 50) / 10 = 1
        x[0] = 60.0;
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((model.positive_probability(&x) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        assert!(zero_model(0.0).validate().is_ok());

        let mut short = zero_model(0.0);
        short.coefficients.pop();
        assert!(matches!(
            short.validate(),
            Err(ModelLoadError::InvalidParameters(_))
        ));

        let mut bad_scale = zero_model(0.0);
        bad_scale.scaler = Some(StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![0.0; FEATURE_COUNT],
        });
        assert!(bad_scale.validate().is_err());
    }
}
