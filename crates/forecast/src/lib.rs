//! `ecoblock-forecast`
//!
//! **Responsibility:** usage forecasting per material type.
//!
//! - Pure and deterministic: identical history and configuration always give
//!   identical output.
//! - Does not read or mutate the stores; callers hand in a history slice and
//!   the current quantity on hand.
//! - Emits ephemeral [`PredictionResult`]s, never persisted.

pub mod config;
pub mod predictor;
pub mod result;

pub use config::{PredictorConfig, PredictorTable};
pub use predictor::UsagePredictor;
pub use result::{PredictionBasis, PredictionResult};
