use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ecoblock_core::{DomainError, DomainResult, Entity, MaterialId, ValueObject};

/// Key identifying a class of construction material (e.g. `RecycledBrick`).
///
/// Always non-empty; surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaterialType(String);

impl MaterialType {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("material type cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for MaterialType {}

impl core::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for MaterialType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MaterialType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaterialType> for String {
    fn from(value: MaterialType) -> Self {
        value.0
    }
}

/// Intake payload: everything a record holds except its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaterial {
    #[serde(rename = "material")]
    pub material_type: MaterialType,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub source: String,
    #[serde(rename = "carbon_savings", with = "rust_decimal::serde::float")]
    pub carbon_savings_kg: Decimal,
    /// Site the batch is earmarked for.
    #[serde(default)]
    pub project_location: Option<String>,
    /// Project the batch was (or will be) used in.
    #[serde(default)]
    pub used_in_project: Option<String>,
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

impl NewMaterial {
    pub fn new(
        material_type: MaterialType,
        quantity: Decimal,
        source: impl Into<String>,
        carbon_savings_kg: Decimal,
    ) -> Self {
        Self {
            material_type,
            quantity,
            source: source.into(),
            carbon_savings_kg,
            project_location: None,
            used_in_project: None,
            date_added: None,
        }
    }

    /// Blank values leave the field unset.
    pub fn with_project_location(mut self, location: impl Into<String>) -> Self {
        self.project_location = non_blank(location.into());
        self
    }

    /// Blank values leave the field unset.
    pub fn with_used_in_project(mut self, project: impl Into<String>) -> Self {
        self.used_in_project = non_blank(project.into());
        self
    }

    pub fn with_date_added(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    /// Check the record-level invariants before anything touches a store.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity < Decimal::ZERO {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.carbon_savings_kg < Decimal::ZERO {
            return Err(DomainError::validation("carbon savings cannot be negative"));
        }
        if self.source.trim().is_empty() {
            return Err(DomainError::validation("source cannot be empty"));
        }
        if self.project_location.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(DomainError::validation("project location cannot be blank"));
        }
        if self.used_in_project.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(DomainError::validation("project name cannot be blank"));
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A stored inventory record for one material type.
///
/// Only stores construct records, so `quantity >= 0` and
/// `carbon_savings_kg >= 0` hold for every value of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialRecord {
    id: MaterialId,
    #[serde(rename = "material")]
    material_type: MaterialType,
    #[serde(with = "rust_decimal::serde::float")]
    quantity: Decimal,
    source: String,
    #[serde(rename = "carbon_savings", with = "rust_decimal::serde::float")]
    carbon_savings_kg: Decimal,
    project_location: Option<String>,
    used_in_project: Option<String>,
    date_added: Option<NaiveDate>,
}

impl MaterialRecord {
    pub(crate) fn from_new(id: MaterialId, new: NewMaterial) -> Self {
        Self {
            id,
            material_type: new.material_type,
            quantity: new.quantity,
            source: new.source,
            carbon_savings_kg: new.carbon_savings_kg,
            project_location: new.project_location,
            used_in_project: new.used_in_project,
            date_added: new.date_added,
        }
    }

    pub(crate) fn with_quantity(&self, quantity: Decimal) -> DomainResult<Self> {
        if quantity < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "quantity for {} cannot go negative",
                self.material_type
            )));
        }
        Ok(Self {
            quantity,
            ..self.clone()
        })
    }

    pub fn id_typed(&self) -> MaterialId {
        self.id
    }

    pub fn material_type(&self) -> &MaterialType {
        &self.material_type
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn carbon_savings_kg(&self) -> Decimal {
        self.carbon_savings_kg
    }

    pub fn project_location(&self) -> Option<&str> {
        self.project_location.as_deref()
    }

    pub fn used_in_project(&self) -> Option<&str> {
        self.used_in_project.as_deref()
    }

    pub fn date_added(&self) -> Option<NaiveDate> {
        self.date_added
    }

    /// The intake view of this record (identity dropped).
    pub fn to_new(&self) -> NewMaterial {
        NewMaterial {
            material_type: self.material_type.clone(),
            quantity: self.quantity,
            source: self.source.clone(),
            carbon_savings_kg: self.carbon_savings_kg,
            project_location: self.project_location.clone(),
            used_in_project: self.used_in_project.clone(),
            date_added: self.date_added,
        }
    }
}

impl Entity for MaterialRecord {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick() -> NewMaterial {
        NewMaterial::new(
            MaterialType::new("RecycledBrick").unwrap(),
            Decimal::from(100),
            "PlantA",
            Decimal::new(125, 1),
        )
    }

    #[test]
    fn material_type_is_trimmed_and_non_empty() {
        assert_eq!(MaterialType::new("  Hempcrete ").unwrap().as_str(), "Hempcrete");
        assert!(matches!(MaterialType::new("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn validate_accepts_zero_values() {
        let mut m = brick();
        m.quantity = Decimal::ZERO;
        m.carbon_savings_kg = Decimal::ZERO;
        assert!(m.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negatives_and_blank_source() {
        let mut m = brick();
        m.quantity = Decimal::from(-1);
        assert!(matches!(m.validate(), Err(DomainError::Validation(_))));

        let mut m = brick();
        m.carbon_savings_kg = Decimal::new(-1, 2);
        assert!(matches!(m.validate(), Err(DomainError::Validation(_))));

        let mut m = brick();
        m.source = " ".to_string();
        assert!(matches!(m.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn record_serializes_with_external_field_names() {
        let record = MaterialRecord::from_new(MaterialId::new(), brick());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["material"], "RecycledBrick");
        assert_eq!(json["quantity"], 100.0);
        assert_eq!(json["source"], "PlantA");
        assert_eq!(json["carbon_savings"], 12.5);
        assert!(json.get("id").is_some());
    }

    #[test]
    fn project_metadata_is_optional_and_carried_into_the_record() {
        let body = r#"{"material":"Cork","quantity":1,"source":"PlantA","carbon_savings":0}"#;
        let bare: NewMaterial = serde_json::from_str(body).unwrap();
        assert_eq!(bare.project_location, None);
        assert_eq!(bare.date_added, None);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let tagged = brick()
            .with_project_location("  Leeds ")
            .with_used_in_project("Library")
            .with_date_added(date);
        let record = MaterialRecord::from_new(MaterialId::new(), tagged.clone());
        assert_eq!(record.project_location(), Some("Leeds"));
        assert_eq!(record.used_in_project(), Some("Library"));
        assert_eq!(record.date_added(), Some(date));
        assert_eq!(record.to_new(), tagged);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date_added"], "2024-03-01");
        assert_eq!(json["project_location"], "Leeds");
    }

    #[test]
    fn blank_metadata_is_dropped_by_builders_and_rejected_when_set_directly() {
        let m = brick().with_project_location("   ");
        assert_eq!(m.project_location, None);

        let mut m = brick();
        m.used_in_project = Some(" ".to_string());
        assert!(matches!(m.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_material_rejects_empty_type_on_deserialize() {
        let body = r#"{"material":"","quantity":1,"source":"PlantA","carbon_savings":0}"#;
        assert!(serde_json::from_str::<NewMaterial>(body).is_err());
    }

    #[test]
    fn with_quantity_refuses_negative() {
        let record = MaterialRecord::from_new(MaterialId::new(), brick());
        assert!(record.with_quantity(Decimal::from(-5)).is_err());
        assert_eq!(record.with_quantity(Decimal::from(5)).unwrap().quantity(), Decimal::from(5));
    }
}
