//! Pre-trained classifiers.
//!
//! Any model implementing [`Classifier`] can sit behind the predictor. The
//! serialized artifact is a [`Model`], tagged by `kind`:
//!
//! ```json
//! { "kind": "random_forest", "n_features": 10, "n_classes": 2, "trees": [ ... ] }
//! { "kind": "logistic_regression", "coef": [ ... ], "intercept": -0.8 }
//! ```

pub mod forest;
pub mod logistic;

use serde::{Deserialize, Serialize};

use crate::{DiabetestError, Result};

pub use forest::{DecisionTree, ForestClassifier};
pub use logistic::LogisticClassifier;

/// Class index treated as "has diabetes".
pub const POSITIVE_CLASS: usize = 1;

/// A fitted probabilistic classifier.
pub trait Classifier: Send + Sync {
    /// Width of the (already scaled) input row.
    fn n_features(&self) -> usize;

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Class probabilities for one row; sums to 1.
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Probability of [`POSITIVE_CLASS`].
    fn positive_probability(&self, x: &[f64]) -> Result<f64> {
        let proba = self.predict_proba(x)?;
        let p = proba
            .get(POSITIVE_CLASS)
            .copied()
            .ok_or_else(|| DiabetestError::InvalidArtifact(format!(
                "model has {} classes, need at least {}",
                proba.len(),
                POSITIVE_CLASS + 1
            )))?;
        if !(0.0..=1.0).contains(&p) {
            return Err(DiabetestError::InvalidProbability(p));
        }
        Ok(p)
    }
}

/// On-disk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForest(ForestClassifier),
    LogisticRegression(LogisticClassifier),
}

impl Model {
    /// Value of the `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Model::RandomForest(_) => "random_forest",
            Model::LogisticRegression(_) => "logistic_regression",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Model::RandomForest(m) => m.validate(),
            Model::LogisticRegression(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Model::RandomForest(m) => m,
            Model::LogisticRegression(m) => m,
        }
    }
}

impl Classifier for Model {
    fn n_features(&self) -> usize { self.inner().n_features() }

    fn n_classes(&self) -> usize { self.inner().n_classes() }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.inner().predict_proba(x)
    }
}

pub(crate) fn check_width(expected: usize, x: &[f64]) -> Result<()> {
    if x.len() != expected {
        return Err(DiabetestError::DimensionMismatch { expected, actual: x.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tag_roundtrip() {
        let text = r#"{"kind":"logistic_regression","coef":[0.5,-0.5],"intercept":0.0}"#;
        let model: Model = serde_json::from_str(text).unwrap();
        assert_eq!(model.kind(), "logistic_regression");
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.n_classes(), 2);
        let p = model.positive_probability(&[0.0, 0.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let text = r#"{"kind":"svm","coef":[1.0]}"#;
        assert!(serde_json::from_str::<Model>(text).is_err());
    }
}
