use rust_decimal::Decimal;
use serde::Serialize;

use ecoblock_inventory::MaterialType;

/// How a prediction was derived, so callers can explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PredictionBasis {
    /// Decay-weighted average of the trailing events.
    WeightedAverage {
        events_used: usize,
        half_life_events: u32,
    },
    /// Too little history: `min(quantity on hand, default rate)`.
    Fallback {
        events_used: usize,
        #[serde(with = "rust_decimal::serde::float")]
        default_rate: Decimal,
    },
}

/// Forecast for the next period. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub material: MaterialType,
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_usage: Decimal,
    pub basis: PredictionBasis,
}

impl PredictionResult {
    pub fn explanation(&self) -> String {
        match &self.basis {
            PredictionBasis::WeightedAverage {
                events_used,
                half_life_events,
            } => format!(
                "{} expected to use {} units: weighted average of {events_used} recent event(s), half-life {half_life_events} event(s)",
                self.material, self.predicted_usage
            ),
            PredictionBasis::Fallback {
                events_used,
                default_rate,
            } => format!(
                "{} expected to use {} units: only {events_used} event(s) recorded, using min(quantity on hand, default rate {default_rate})",
                self.material, self.predicted_usage
            ),
        }
    }
}
