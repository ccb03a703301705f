//! # diabetest-serve
//!
//! HTTP front end for a loaded [`Predictor`](diabetest_core::Predictor).
//!
//! ```rust,no_run
//! use diabetest_core::{Predictor, Variant};
//! use diabetest_serve::state::AppState;
//! # async fn run() -> anyhow::Result<()> {
//! let variant = Variant::Forest;
//! let predictor = Predictor::load(
//!     variant.default_model_path().as_ref(),
//!     "models/scaler.json".as_ref(),
//!     variant.policy(),
//! )?;
//! let state = AppState::new(predictor, "forest.json".into(), variant);
//! diabetest_serve::server::serve_with_state("0.0.0.0:8000", state).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Provides:
//! - `POST /predict`: risk assessment for one patient record
//! - `GET /health`: liveness and loaded-model info

pub mod api;
pub mod health;
pub mod server;
pub mod state;

pub use server::{build_router, serve_with_state};
pub use state::AppState;
