use axum::{
    Router,
    routing::{get, post},
};

pub mod analytics;
pub mod materials;
pub mod predict;
pub mod system;

/// Router for all service endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/materials", get(materials::list_materials).post(materials::add_material))
        .route("/materials/export", get(materials::export_materials))
        .route("/materials/import", post(materials::import_materials))
        .route(
            "/materials/:material",
            get(materials::get_material).delete(materials::remove_material),
        )
        .route("/materials/:material/restock", post(materials::restock))
        .route("/materials/:material/usage", post(materials::record_usage))
        .route("/predict/:material", get(predict::predict_usage))
        .route("/analytics/carbon_savings", get(analytics::carbon_savings))
        .route("/suggest-materials/:material", get(analytics::suggest_alternatives))
}
