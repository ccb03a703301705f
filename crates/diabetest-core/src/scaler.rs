//! Standard scaler: `z = (x - mean) / scale`.

use serde::{Deserialize, Serialize};

use crate::{DiabetestError, Result};

/// Per-column standardization fitted offline.
///
/// A zero entry in `scale` marks a constant column and is applied as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
}

fn default_true() -> bool { true }

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale, with_mean: true, with_std: true }
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize { self.mean.len() }

    /// Check structural consistency after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            return Err(DiabetestError::InvalidArtifact("scaler has no columns".into()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(DiabetestError::InvalidArtifact(format!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(i) = self.mean.iter().chain(&self.scale).position(|v| !v.is_finite()) {
            return Err(DiabetestError::InvalidArtifact(format!(
                "scaler parameter {} is not finite",
                i
            )));
        }
        Ok(())
    }

    /// Standardize one row.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.n_features() {
            return Err(DiabetestError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.len(),
            });
        }

        Ok(x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&v, (&mean, &scale))| {
                let centered = if self.with_mean { v - mean } else { v };
                if self.with_std && scale != 0.0 { centered / scale } else { centered }
            })
            .collect())
    }
}
