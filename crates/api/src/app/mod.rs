//! HTTP API application wiring (Axum router + service handle).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and decimal parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use ecoblock_inventory::InMemoryMaterialStore;
use ecoblock_service::InventoryService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Service handle shared by every handler.
pub type SharedService = Arc<InventoryService<InMemoryMaterialStore>>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(service: SharedService) -> Router {
    Router::new()
        .route("/", get(routes::system::health))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(service)),
        )
}
