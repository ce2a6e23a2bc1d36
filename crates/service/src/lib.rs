//! Service layer: the operations the request boundary calls.
//!
//! [`InventoryService`] owns handles to the material store, the usage
//! history and the predictor, and is the only place where invariants that
//! span both stores are enforced.

pub mod analytics;
pub mod config;
pub mod export;
pub mod import;
pub mod inventory_service;


pub use analytics::CarbonSummary;
pub use config::ServiceConfig;
pub use import::ImportSummary;
pub use inventory_service::InventoryService;
