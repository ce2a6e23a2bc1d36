use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use ecoblock_core::{DomainError, DomainResult};
use ecoblock_inventory::{MaterialType, UsageEvent};

use crate::config::{PredictorConfig, PredictorTable};
use crate::result::{PredictionBasis, PredictionResult};

/// Output precision (decimal places).
const OUTPUT_DP: u32 = 2;

/// Deterministic usage forecaster.
///
/// Model:
/// - Walk the history newest to oldest.
/// - Weight the k-th most recent event by `0.5^(k / half_life)`.
/// - Predict the weighted mean of the amounts.
/// - With fewer than two events, fall back to `min(quantity on hand, default rate)`.
///
/// Arithmetic runs at full decimal precision; only the returned value is
/// rounded (half-up, two places).
#[derive(Debug, Clone, Default)]
pub struct UsagePredictor {
    table: PredictorTable,
}

impl UsagePredictor {
    pub fn new(table: PredictorTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PredictorTable {
        &self.table
    }

    pub fn config_for(&self, material_type: &MaterialType) -> &PredictorConfig {
        self.table.config_for(material_type)
    }

    /// Forecast next-period usage for `material_type`.
    ///
    /// `history` must be the windowed events of that type, oldest first.
    /// Short history is not an error; it selects the fallback.
    pub fn predict(
        &self,
        material_type: &MaterialType,
        history: &[UsageEvent],
        current_quantity: Decimal,
    ) -> DomainResult<PredictionResult> {
        if let Some(stray) = history.iter().find(|e| e.material_type() != material_type) {
            return Err(DomainError::validation(format!(
                "history for {material_type} contains an event for {}",
                stray.material_type()
            )));
        }

        let config = self.table.config_for(material_type);

        let (raw, basis) = if history.len() < 2 {
            let on_hand = current_quantity.max(Decimal::ZERO);
            (
                on_hand.min(config.default_rate()),
                PredictionBasis::Fallback {
                    events_used: history.len(),
                    default_rate: config.default_rate(),
                },
            )
        } else {
            (
                weighted_average(history, config.half_life_events())?,
                PredictionBasis::WeightedAverage {
                    events_used: history.len(),
                    half_life_events: config.half_life_events(),
                },
            )
        };

        let predicted_usage = round_output(raw);
        tracing::debug!(
            material = %material_type,
            events = history.len(),
            raw = %raw,
            predicted = %predicted_usage,
            "usage predicted"
        );

        Ok(PredictionResult {
            material: material_type.clone(),
            predicted_usage,
            basis,
        })
    }
}

/// Per-step decay factor `0.5^(1 / half_life)`.
fn decay_per_event(half_life_events: u32) -> Decimal {
    let half_life = Decimal::from(half_life_events.max(1));
    Decimal::new(5, 1).powd(Decimal::ONE / half_life)
}

/// Weighted mean kept as a running mean, so intermediate values stay within
/// the range of the amounts instead of growing with their sum.
fn weighted_average(history: &[UsageEvent], half_life_events: u32) -> DomainResult<Decimal> {
    let decay = decay_per_event(half_life_events);

    let mut weight = Decimal::ONE;
    let mut total_weight = Decimal::ZERO;
    let mut mean = Decimal::ZERO;

    for event in history.iter().rev() {
        total_weight = total_weight.checked_add(weight).ok_or_else(overflow)?;
        let share = weight.checked_div(total_weight).ok_or_else(overflow)?;
        let delta = event.amount().checked_sub(mean).ok_or_else(overflow)?;
        let step = share.checked_mul(delta).ok_or_else(overflow)?;
        mean = mean.checked_add(step).ok_or_else(overflow)?;
        weight = weight.checked_mul(decay).ok_or_else(overflow)?;
    }

    Ok(mean)
}

fn overflow() -> DomainError {
    DomainError::validation("usage history is too large to average")
}

fn round_output(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(OUTPUT_DP, RoundingStrategy::MidpointAwayFromZero)
}
