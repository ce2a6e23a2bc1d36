use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use ecoblock_core::DomainResult;
use ecoblock_inventory::{MaterialType, NewMaterial};

// -------------------------
// Request DTOs
// -------------------------

/// `POST /materials` body. Field names are part of the external contract.
#[derive(Debug, Deserialize)]
pub struct AddMaterialRequest {
    pub material: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub carbon_savings: Decimal,
    #[serde(default)]
    pub project_location: Option<String>,
    #[serde(default)]
    pub used_in_project: Option<String>,
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

impl AddMaterialRequest {
    pub fn into_new_material(self) -> DomainResult<NewMaterial> {
        let mut material = NewMaterial::new(
            MaterialType::new(self.material)?,
            self.quantity,
            self.source,
            self.carbon_savings,
        );
        if let Some(location) = self.project_location {
            material = material.with_project_location(location);
        }
        if let Some(project) = self.used_in_project {
            material = material.with_used_in_project(project);
        }
        if let Some(date) = self.date_added {
            material = material.with_date_added(date);
        }
        Ok(material)
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordUsageRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Defaults to the time the request is handled.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}
