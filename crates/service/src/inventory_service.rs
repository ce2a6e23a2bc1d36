use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use ecoblock_core::{DomainError, DomainResult};
use ecoblock_forecast::{PredictionResult, UsagePredictor};
use ecoblock_inventory::{
    InMemoryMaterialStore, MaterialRecord, MaterialStore, MaterialType, NewMaterial,
    SourceRegistry, UsageEvent, UsageHistory,
};

use crate::analytics::{self, CarbonSummary};
use crate::config::ServiceConfig;
use crate::export;
use crate::import::{self, ImportSummary};

/// Orchestrates the material store, the usage history and the predictor.
///
/// Created once at process start and shared (`Arc`) between request
/// handlers; all methods take `&self`.
#[derive(Debug)]
pub struct InventoryService<S: MaterialStore> {
    store: S,
    history: Arc<UsageHistory>,
    predictor: UsagePredictor,
    sources: Option<SourceRegistry>,
}

impl InventoryService<InMemoryMaterialStore> {
    /// Fresh in-memory stores configured from `config`.
    pub fn in_memory(config: &ServiceConfig) -> DomainResult<Self> {
        Ok(Self::new(
            InMemoryMaterialStore::new(),
            Arc::new(config.usage_history()),
            UsagePredictor::new(config.predictor_table()?),
        )
        .with_source_registry(config.source_registry()))
    }
}

impl<S: MaterialStore> InventoryService<S> {
    pub fn new(store: S, history: Arc<UsageHistory>, predictor: UsagePredictor) -> Self {
        Self {
            store,
            history,
            predictor,
            sources: None,
        }
    }

    /// When set, intake from suppliers outside the registry is rejected.
    pub fn with_source_registry(mut self, sources: Option<SourceRegistry>) -> Self {
        self.sources = sources;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> &UsageHistory {
        &self.history
    }

    pub fn predictor(&self) -> &UsagePredictor {
        &self.predictor
    }

    /// Validate an intake and store it, replacing any record of the same type.
    pub fn add_material(
        &self,
        material_type: &str,
        quantity: Decimal,
        source: &str,
        carbon_savings_kg: Decimal,
    ) -> DomainResult<MaterialRecord> {
        self.intake(NewMaterial::new(
            MaterialType::new(material_type)?,
            quantity,
            source,
            carbon_savings_kg,
        ))
    }

    /// [`add_material`](Self::add_material) for a full payload, project
    /// metadata included.
    pub fn intake(&self, material: NewMaterial) -> DomainResult<MaterialRecord> {
        let material = self.checked_intake(material)?;
        let record = self.store.upsert(material)?;
        tracing::info!(
            material = %record.material_type(),
            id = %record.id_typed(),
            quantity = %record.quantity(),
            "material stored"
        );
        Ok(record)
    }

    fn checked_intake(&self, mut material: NewMaterial) -> DomainResult<NewMaterial> {
        material.source = material.source.trim().to_string();
        material.validate()?;

        if let Some(sources) = &self.sources {
            if !sources.is_verified(&material.source) {
                tracing::warn!(material = %material.material_type, source = %material.source, "intake rejected: unverified source");
                return Err(DomainError::validation(format!(
                    "source {:?} is not a verified supplier",
                    material.source
                )));
            }
        }
        Ok(material)
    }

    /// Bulk intake from CSV text (see [`import`]).
    ///
    /// Every row is parsed and validated before any is stored, so one bad
    /// row imports nothing. A row whose material is already stored with the
    /// same `date_added` counts as imported before and is skipped; any other
    /// row replaces the stored record like [`intake`](Self::intake).
    pub fn import_csv(&self, text: &str) -> DomainResult<ImportSummary> {
        let rows = import::parse_materials_csv(text)?
            .into_iter()
            .map(|row| self.checked_intake(row))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut summary = ImportSummary::default();
        for row in rows {
            match self.store.get(&row.material_type) {
                Ok(existing) if existing.date_added() == row.date_added => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(_) | Err(DomainError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            self.store.upsert(row)?;
            summary.imported += 1;
        }

        tracing::info!(imported = summary.imported, skipped = summary.skipped, "csv import finished");
        Ok(summary)
    }

    pub fn list_materials(&self) -> DomainResult<Vec<MaterialRecord>> {
        self.store.list()
    }

    pub fn material(&self, material_type: &str) -> DomainResult<MaterialRecord> {
        self.store.get(&MaterialType::new(material_type)?)
    }

    /// Delete a record. Its usage history is kept.
    pub fn remove_material(&self, material_type: &str) -> DomainResult<MaterialRecord> {
        let record = self.store.remove(&MaterialType::new(material_type)?)?;
        tracing::info!(material = %record.material_type(), "material removed");
        Ok(record)
    }

    pub fn restock(&self, material_type: &str, amount: Decimal) -> DomainResult<MaterialRecord> {
        let material_type = MaterialType::new(material_type)?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("restock amount must be positive"));
        }
        let record = self
            .store
            .adjust_quantity(&material_type, &mut |r: &MaterialRecord| {
                r.quantity().checked_add(amount).ok_or_else(|| {
                    DomainError::validation(format!(
                        "restocking {amount} of {} overflows the quantity on hand",
                        r.material_type()
                    ))
                })
            })?;
        tracing::info!(material = %material_type, amount = %amount, quantity = %record.quantity(), "material restocked");
        Ok(record)
    }

    /// Consume `amount` units: append a usage event and decrement the
    /// quantity on hand, both or neither.
    pub fn record_usage(
        &self,
        material_type: &str,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<UsageEvent> {
        let material_type = MaterialType::new(material_type)?;
        let event = UsageEvent::new(material_type.clone(), amount, timestamp)?;

        // The history append happens under the material's write lock, after
        // every check that could still fail on the store side.
        let history = &self.history;
        let result = self.store.adjust_quantity(&material_type, &mut |r: &MaterialRecord| {
            if amount > r.quantity() {
                return Err(DomainError::validation(format!(
                    "cannot consume {amount} of {}: only {} on hand",
                    r.material_type(),
                    r.quantity()
                )));
            }
            history.record(event.clone())?;
            Ok(r.quantity() - amount)
        });

        match result {
            Ok(record) => {
                tracing::info!(material = %material_type, amount = %amount, quantity = %record.quantity(), "usage recorded");
                Ok(event)
            }
            Err(e) => {
                tracing::warn!(material = %material_type, error = %e, "usage rejected");
                Err(e)
            }
        }
    }

    /// Forecast next-period usage.
    ///
    /// A type absent from the store fails with `InsufficientData`; it never
    /// yields a placeholder estimate.
    pub fn predict_usage(&self, material_type: &str) -> DomainResult<PredictionResult> {
        let material_type = MaterialType::new(material_type)?;
        let window = self.predictor.config_for(&material_type).window();

        let mut prediction = None;
        let outcome = self.store.read_with(&material_type, &mut |record: &MaterialRecord| {
            let events = self.history.events_for(&material_type, window)?;
            prediction = Some(self.predictor.predict(&material_type, &events, record.quantity())?);
            Ok(())
        });

        match outcome {
            Ok(()) => {}
            Err(DomainError::NotFound(_)) => {
                tracing::warn!(material = %material_type, "prediction requested for unknown material");
                return Err(DomainError::insufficient_data(format!(
                    "material {material_type} is not in the inventory"
                )));
            }
            Err(e) => return Err(e),
        }

        let prediction = prediction
            .ok_or_else(|| DomainError::internal("prediction was not produced"))?;
        tracing::info!(
            material = %prediction.material,
            predicted_usage = %prediction.predicted_usage,
            explanation = %prediction.explanation(),
            "usage predicted"
        );
        Ok(prediction)
    }

    pub fn carbon_savings_summary(&self) -> DomainResult<CarbonSummary> {
        analytics::carbon_summary(&self.store.list()?)
    }

    /// Up to five other materials with higher carbon savings, best first.
    pub fn suggest_alternatives(&self, material_type: &str) -> DomainResult<Vec<MaterialRecord>> {
        let reference = self.material(material_type)?;
        let records = self.store.list()?;
        Ok(analytics::greener_alternatives(&reference, &records))
    }

    pub fn export_csv(&self) -> DomainResult<String> {
        Ok(export::materials_to_csv(&self.store.list()?))
    }
}
