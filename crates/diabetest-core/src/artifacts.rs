//! Loading the serialized scaler and model at startup.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::model::Model;
use crate::scaler::StandardScaler;
use crate::{DiabetestError, Result};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| DiabetestError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DiabetestError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}

fn named(path: &Path, e: DiabetestError) -> DiabetestError {
    match e {
        DiabetestError::InvalidArtifact(msg) => {
            DiabetestError::InvalidArtifact(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}

/// Read and validate a scaler artifact.
pub fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let scaler: StandardScaler = read_json(path)?;
    scaler.validate().map_err(|e| named(path, e))?;
    tracing::debug!("Loaded scaler with {} columns from {}", scaler.n_features(), path.display());
    Ok(scaler)
}

/// Read and validate a model artifact.
pub fn load_model(path: &Path) -> Result<Model> {
    let model: Model = read_json(path)?;
    model.validate().map_err(|e| named(path, e))?;
    tracing::debug!("Loaded {} model from {}", model.kind(), path.display());
    Ok(model)
}
