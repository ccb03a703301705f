//! # diabetest-core
//!
//! Everything behind the `/predict` endpoint, independent of HTTP:
//! - [`PatientRecord`]: ten named measurements in fixed model order
//! - [`StandardScaler`]: offline-fitted feature standardization
//! - [`Model`]: random-forest or logistic classifier behind [`Classifier`]
//! - [`RiskPolicy`]: probability to risk tier
//! - [`Predictor`]: the straight-line scale, infer, bucket flow

pub mod artifacts;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod risk;
pub mod scaler;

pub use error::DiabetestError;
pub use features::{PatientRecord, FEATURE_NAMES, NUM_FEATURES};
pub use model::{Classifier, Model};
pub use predictor::Predictor;
pub use risk::{Assessment, RiskPolicy, RiskTier, Variant};
pub use scaler::StandardScaler;

pub type Result<T> = std::result::Result<T, DiabetestError>;
