//! HTTP boundary: routing and request/response mapping onto `InventoryService`.
//!
//! Handlers hold no state of their own; every invariant lives in the service.

pub mod app;
pub mod middleware;
