//! Binary logistic regression.

use serde::{Deserialize, Serialize};

use super::{check_width, Classifier};
use crate::{DiabetestError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(DiabetestError::InvalidArtifact("logistic model has no coefficients".into()));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(DiabetestError::InvalidArtifact(
                "logistic model has non-finite parameters".into(),
            ));
        }
        Ok(())
    }

    /// Raw decision value `w·x + b`.
    pub fn decision_function(&self, x: &[f64]) -> Result<f64> {
        check_width(self.coef.len(), x)?;
        Ok(self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.intercept)
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticClassifier {
    fn n_features(&self) -> usize { self.coef.len() }

    fn n_classes(&self) -> usize { 2 }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        let p = sigmoid(self.decision_function(x)?);
        Ok(vec![1.0 - p, p])
    }
}
