//! Scale, infer, bucket.

use std::path::Path;

use crate::artifacts::{load_model, load_scaler};
use crate::features::{PatientRecord, NUM_FEATURES};
use crate::model::{Classifier, Model};
use crate::risk::{Assessment, RiskPolicy};
use crate::scaler::StandardScaler;
use crate::{DiabetestError, Result};

/// Scaler, model and bucketing policy, immutable once built.
#[derive(Debug, Clone)]
pub struct Predictor {
    scaler: StandardScaler,
    model: Model,
    policy: RiskPolicy,
}

impl Predictor {
    /// Pair a scaler with a model after checking they agree on width.
    pub fn new(scaler: StandardScaler, model: Model, policy: RiskPolicy) -> Result<Self> {
        scaler.validate()?;
        model.validate()?;
        if scaler.n_features() != NUM_FEATURES {
            return Err(DiabetestError::InvalidArtifact(format!(
                "scaler expects {} features, patient records have {}",
                scaler.n_features(),
                NUM_FEATURES
            )));
        }
        if model.n_features() != NUM_FEATURES {
            return Err(DiabetestError::InvalidArtifact(format!(
                "{} model expects {} features, patient records have {}",
                model.kind(),
                model.n_features(),
                NUM_FEATURES
            )));
        }
        if model.n_classes() != 2 {
            return Err(DiabetestError::InvalidArtifact(format!(
                "{} model has {} classes, expected a binary classifier",
                model.kind(),
                model.n_classes()
            )));
        }
        Ok(Self { scaler, model, policy })
    }

    /// Load both artifacts from disk.
    pub fn load(model_path: &Path, scaler_path: &Path, policy: RiskPolicy) -> Result<Self> {
        let scaler = load_scaler(scaler_path)?;
        let model = load_model(model_path)?;
        Self::new(scaler, model, policy)
    }

    pub fn model(&self) -> &Model { &self.model }

    pub fn scaler(&self) -> &StandardScaler { &self.scaler }

    pub fn policy(&self) -> RiskPolicy { self.policy }

    /// Positive-class probability for one record.
    pub fn probability(&self, record: &PatientRecord) -> Result<f64> {
        let scaled = self.scaler.transform(&record.to_vector())?;
        self.model.positive_probability(&scaled)
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<Assessment> {
        let p = self.probability(record)?;
        let assessment = self.policy.assess(p);
        tracing::debug!(
            "p={:.4} -> {} ({})",
            p,
            assessment.risk_level,
            assessment.probability.as_deref().unwrap_or("hidden")
        );
        Ok(assessment)
    }
}
