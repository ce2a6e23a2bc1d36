//! Inventory domain module: material records and their consumption history.
//!
//! Both stores are safe to share across threads. Writers serialize per
//! material type; different material types never contend with each other.

pub mod material;
pub mod source;
pub mod store;
pub mod usage;

pub use material::{MaterialRecord, MaterialType, NewMaterial};
pub use source::SourceRegistry;
pub use store::{InMemoryMaterialStore, MaterialStore};
pub use usage::{HistoryWindow, UsageEvent, UsageHistory};
