use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;

use ecoblock_core::{DomainError, DomainResult, MaterialId};

use crate::material::{MaterialRecord, MaterialType, NewMaterial};

/// Authoritative collection of material records, keyed by material type.
///
/// Every operation is atomic with respect to concurrent callers: a reader
/// never observes a half-written record, and a failed write leaves the prior
/// record untouched.
pub trait MaterialStore: Send + Sync {
    /// Insert a new record or replace the record with the same material type.
    ///
    /// A replacement keeps the existing record's id.
    fn upsert(&self, material: NewMaterial) -> DomainResult<MaterialRecord>;

    fn get(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord>;

    /// All records in insertion order.
    fn list(&self) -> DomainResult<Vec<MaterialRecord>>;

    /// Delete the record. Removing an unknown type is an error, not a no-op.
    fn remove(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord>;

    /// Run `read` against the current record while writers of that material
    /// type are held off.
    fn read_with(
        &self,
        material_type: &MaterialType,
        read: &mut dyn FnMut(&MaterialRecord) -> DomainResult<()>,
    ) -> DomainResult<()>;

    /// Read-modify-write of a record's quantity under the material's lock.
    ///
    /// `decide` receives the current record and returns the new quantity;
    /// if it fails (or the result is negative) nothing is written.
    fn adjust_quantity(
        &self,
        material_type: &MaterialType,
        decide: &mut dyn FnMut(&MaterialRecord) -> DomainResult<Decimal>,
    ) -> DomainResult<MaterialRecord>;
}

impl<S> MaterialStore for Arc<S>
where
    S: MaterialStore + ?Sized,
{
    fn upsert(&self, material: NewMaterial) -> DomainResult<MaterialRecord> {
        (**self).upsert(material)
    }

    fn get(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord> {
        (**self).get(material_type)
    }

    fn list(&self) -> DomainResult<Vec<MaterialRecord>> {
        (**self).list()
    }

    fn remove(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord> {
        (**self).remove(material_type)
    }

    fn read_with(
        &self,
        material_type: &MaterialType,
        read: &mut dyn FnMut(&MaterialRecord) -> DomainResult<()>,
    ) -> DomainResult<()> {
        (**self).read_with(material_type, read)
    }

    fn adjust_quantity(
        &self,
        material_type: &MaterialType,
        decide: &mut dyn FnMut(&MaterialRecord) -> DomainResult<Decimal>,
    ) -> DomainResult<MaterialRecord> {
        (**self).adjust_quantity(material_type, decide)
    }
}

/// One material type's cell. `retired` is set once the cell has been
/// unlinked by `remove`; writers holding a stale `Arc` must look it up again.
#[derive(Debug)]
struct Slot {
    seq: u64,
    state: RwLock<SlotState>,
}

#[derive(Debug)]
struct SlotState {
    record: MaterialRecord,
    retired: bool,
}

/// In-memory store with a lock per material type.
///
/// Lock order: slot, then map. The map lock is only held to find or link a
/// slot, and nothing waits on a slot lock while holding it.
#[derive(Debug)]
pub struct InMemoryMaterialStore {
    slots: RwLock<HashMap<MaterialType, Arc<Slot>>>,
    next_seq: AtomicU64,
}

impl InMemoryMaterialStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    fn slot(&self, material_type: &MaterialType) -> DomainResult<Option<Arc<Slot>>> {
        let slots = self.slots.read().map_err(|_| poisoned())?;
        Ok(slots.get(material_type).cloned())
    }
}

impl Default for InMemoryMaterialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("material store lock poisoned")
}

fn missing(material_type: &MaterialType) -> DomainError {
    DomainError::not_found(format!("material {material_type}"))
}

impl MaterialStore for InMemoryMaterialStore {
    fn upsert(&self, material: NewMaterial) -> DomainResult<MaterialRecord> {
        material.validate()?;

        loop {
            let existing = match self.slot(&material.material_type)? {
                Some(slot) => slot,
                None => {
                    let mut slots = self.slots.write().map_err(|_| poisoned())?;
                    let linked = match slots.entry(material.material_type.clone()) {
                        Entry::Occupied(e) => Arc::clone(e.get()),
                        Entry::Vacant(e) => {
                            let record = MaterialRecord::from_new(MaterialId::new(), material);
                            e.insert(Arc::new(Slot {
                                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                                state: RwLock::new(SlotState {
                                    record: record.clone(),
                                    retired: false,
                                }),
                            }));
                            tracing::debug!(material = %record.material_type(), "material inserted");
                            return Ok(record);
                        }
                    };
                    linked
                }
            };

            let mut state = existing.state.write().map_err(|_| poisoned())?;
            if state.retired {
                // Removed between lookup and lock; retry against the live map.
                continue;
            }
            let record = MaterialRecord::from_new(state.record.id_typed(), material);
            state.record = record.clone();
            tracing::debug!(material = %record.material_type(), "material replaced");
            return Ok(record);
        }
    }

    fn get(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord> {
        let slot = self.slot(material_type)?.ok_or_else(|| missing(material_type))?;
        let state = slot.state.read().map_err(|_| poisoned())?;
        if state.retired {
            return Err(missing(material_type));
        }
        Ok(state.record.clone())
    }

    fn list(&self) -> DomainResult<Vec<MaterialRecord>> {
        let mut slots: Vec<Arc<Slot>> = {
            let map = self.slots.read().map_err(|_| poisoned())?;
            map.values().cloned().collect()
        };
        slots.sort_by_key(|s| s.seq);

        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            let state = slot.state.read().map_err(|_| poisoned())?;
            if !state.retired {
                out.push(state.record.clone());
            }
        }
        Ok(out)
    }

    fn remove(&self, material_type: &MaterialType) -> DomainResult<MaterialRecord> {
        loop {
            let slot = self.slot(material_type)?.ok_or_else(|| missing(material_type))?;
            let mut state = slot.state.write().map_err(|_| poisoned())?;
            if state.retired {
                continue;
            }
            state.retired = true;

            let mut slots = self.slots.write().map_err(|_| poisoned())?;
            if slots
                .get(material_type)
                .is_some_and(|linked| Arc::ptr_eq(linked, &slot))
            {
                slots.remove(material_type);
            }
            tracing::debug!(material = %material_type, "material removed");
            return Ok(state.record.clone());
        }
    }

    fn read_with(
        &self,
        material_type: &MaterialType,
        read: &mut dyn FnMut(&MaterialRecord) -> DomainResult<()>,
    ) -> DomainResult<()> {
        let slot = self.slot(material_type)?.ok_or_else(|| missing(material_type))?;
        let state = slot.state.read().map_err(|_| poisoned())?;
        if state.retired {
            return Err(missing(material_type));
        }
        read(&state.record)
    }

    fn adjust_quantity(
        &self,
        material_type: &MaterialType,
        decide: &mut dyn FnMut(&MaterialRecord) -> DomainResult<Decimal>,
    ) -> DomainResult<MaterialRecord> {
        loop {
            let slot = self.slot(material_type)?.ok_or_else(|| missing(material_type))?;
            let mut state = slot.state.write().map_err(|_| poisoned())?;
            if state.retired {
                continue;
            }
            let quantity = decide(&state.record)?;
            let updated = state.record.with_quantity(quantity)?;
            state.record = updated.clone();
            return Ok(updated);
        }
    }
}
