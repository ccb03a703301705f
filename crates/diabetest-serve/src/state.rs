//! Shared application state holding the loaded predictor.

use std::sync::Arc;

use diabetest_core::{Predictor, Variant};

/// Shared state for the inference server.
///
/// The predictor is read-only after startup, so handlers share it through
/// an `Arc` without locking.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    /// Model file name for health responses.
    pub model_name: String,
    pub variant: Variant,
}

impl AppState {
    pub fn new(predictor: Predictor, model_name: String, variant: Variant) -> Self {
        Self {
            predictor: Arc::new(predictor),
            model_name,
            variant,
        }
    }
}
