//! Read-only aggregates over the material list.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use ecoblock_core::{DomainError, DomainResult};
use ecoblock_inventory::MaterialRecord;

/// Maximum number of alternatives suggested for one material.
pub const MAX_ALTERNATIVES: usize = 5;

/// Carbon savings across the whole inventory, rounded to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarbonSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
}

/// Fails with `Validation` when the total does not fit in a `Decimal`.
pub fn carbon_summary(records: &[MaterialRecord]) -> DomainResult<CarbonSummary> {
    let total = records
        .iter()
        .map(MaterialRecord::carbon_savings_kg)
        .try_fold(Decimal::ZERO, |acc, kg| acc.checked_add(kg))
        .ok_or_else(|| DomainError::validation("total carbon savings overflows"))?;
    let average = if records.is_empty() {
        Decimal::ZERO
    } else {
        total / Decimal::from(records.len())
    };
    Ok(CarbonSummary {
        total: round2(total),
        average: round2(average),
    })
}

/// Other materials with strictly higher carbon savings than `reference`,
/// best first, at most [`MAX_ALTERNATIVES`].
pub fn greener_alternatives(
    reference: &MaterialRecord,
    records: &[MaterialRecord],
) -> Vec<MaterialRecord> {
    let mut better: Vec<MaterialRecord> = records
        .iter()
        .filter(|r| r.material_type() != reference.material_type())
        .filter(|r| r.carbon_savings_kg() > reference.carbon_savings_kg())
        .cloned()
        .collect();
    // Stable sort: ties keep insertion order.
    better.sort_by(|a, b| b.carbon_savings_kg().cmp(&a.carbon_savings_kg()));
    better.truncate(MAX_ALTERNATIVES);
    better
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
