//! Model adapter: Implementation of RiskClassifier backed by a JSON artifact.
//!
//! The training pipeline exports the fitted classifier as `model.json`:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "feature_names": ["age", "sex", "cp", ...],
//!   "description": "trained on cleveland.csv, 2024-03-01",
//!   "model": { "kind": "logistic_regression", "coefficients": [...], "intercept": 0.1 }
//! }
//! ```
//!
//! `kind` is either `logistic_regression` or `random_forest`. A forest holds
//! sklearn `tree_` arrays per tree; `value` may be exported as-is from
//! `tree_.value.tolist()` (`[[[neg, pos]], ...]`) or flattened to `[[neg, pos], ...]`.
//! `description` is optional and is shown with the model name.
//!
//! # Load-time checks
//!
//! - `feature_names` must equal `FEATURE_NAMES` in order. This is the only
//!   place the training-time feature order can be confirmed; a reordered
//!   artifact would otherwise score garbage without any visible error.
//! - Parameter shapes are validated once, so inference never indexes out of
//!   bounds.
//! - If `manifest.json` is present, the artifact's SHA-256 must match it.

mod forest;
mod logistic;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, FieldId, FEATURE_COUNT};
use crate::ports::{ClassifierError, RiskClassifier};

pub use forest::{DecisionTree, RandomForest};
pub use logistic::{LogisticRegression, StandardScaler};
pub use manifest::{ModelManifest, MANIFEST_FILE};

/// Default artifact name when the configured path is a directory.
pub const MODEL_FILE: &str = "model.json";

/// Supported artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while loading the model artifact at startup.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model file not found at {0:?}")]
    NotFound(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported format_version {0} (expected {expected})", expected = FORMAT_VERSION)]
    UnsupportedVersion(u32),

    #[error("model declares {found} features, expected {expected}", expected = FEATURE_COUNT)]
    FeatureCount { found: usize },

    #[error("feature order mismatch at position {position}: model has `{found}`, expected `{expected}`")]
    FeatureOrder {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("invalid model parameters: {0}")]
    InvalidParameters(String),

    #[error("manifest check failed: {0}")]
    Manifest(String),

    #[error("{file} required but not found in {0:?}", file = MANIFEST_FILE)]
    ManifestRequired(PathBuf),
}

/// The fitted estimator inside an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl Estimator {
    fn validate(&self) -> Result<(), ModelLoadError> {
        match self {
            Self::LogisticRegression(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
        }
    }
}

/// On-disk model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Provenance note shown next to the model name, e.g. the training run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: Estimator,
}

impl ModelArtifact {
    /// Parse and validate an artifact.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the artifact violates the
    /// feature contract.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion(self.format_version));
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ModelLoadError::FeatureCount {
                found: self.feature_names.len(),
            });
        }
        for (found, field) in self.feature_names.iter().zip(FieldId::ALL) {
            if found != field.feature_name() {
                return Err(ModelLoadError::FeatureOrder {
                    position: field.index(),
                    expected: field.feature_name(),
                    found: found.clone(),
                });
            }
        }
        self.model.validate()
    }
}

/// A loaded, validated model. Read-only after construction.
#[derive(Debug, Clone)]
pub struct JsonModelClassifier {
    estimator: Estimator,
    name: String,
}

impl JsonModelClassifier {
    /// Load model parameters from a file, or from `model.json` inside a directory.
    ///
    /// # Errors
    /// Returns error if the artifact cannot be read, fails the manifest check,
    /// or does not satisfy the feature contract.
    pub fn load(path: &Path, require_manifest: bool) -> Result<Self, ModelLoadError> {
        let model_path = if path.is_dir() {
            path.join(MODEL_FILE)
        } else {
            path.to_path_buf()
        };
        if !model_path.is_file() {
            return Err(ModelLoadError::NotFound(model_path));
        }

        let bytes = fs::read(&model_path).map_err(|source| ModelLoadError::Read {
            path: model_path.clone(),
            source,
        })?;

        let base_dir = model_path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| MODEL_FILE.to_string());

        match ModelManifest::read_from(base_dir)? {
            Some(manifest) => {
                manifest.verify(&file_name, &bytes)?;
                tracing::info!("Model hash verified against {MANIFEST_FILE}");
            }
            None if require_manifest => {
                return Err(ModelLoadError::ManifestRequired(base_dir.to_path_buf()));
            }
            None => {
                tracing::warn!(
                    "No {MANIFEST_FILE} next to {:?}; loading model without integrity check",
                    model_path
                );
            }
        }

        let classifier = Self::from_json(&bytes)?;

        tracing::info!(
            "Loaded model from {:?} (kind={}, n_features={})",
            model_path,
            classifier.estimator.kind(),
            FEATURE_COUNT
        );
        Ok(classifier)
    }

    /// Parse, validate and wrap an artifact for inference.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the artifact violates the
    /// feature contract.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        Ok(Self::from_validated(ModelArtifact::from_json(bytes)?))
    }

    fn from_validated(artifact: ModelArtifact) -> Self {
        let kind = match &artifact.model {
            Estimator::LogisticRegression(_) => "logistic regression".to_string(),
            Estimator::RandomForest(f) => format!("random forest ({} trees)", f.trees.len()),
        };
        let name = match artifact.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => format!("{kind}: {description}"),
            _ => kind,
        };
        Self {
            estimator: artifact.model,
            name,
        }
    }
}

impl RiskClassifier for JsonModelClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        match &self.estimator {
            Estimator::LogisticRegression(m) => {
                let p = m.positive_probability(features);
                Ok(vec![1.0 - p, p])
            }
            Estimator::RandomForest(m) => Ok(m.predict_proba(features)?.to_vec()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
