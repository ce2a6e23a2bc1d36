use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::{SharedService, errors};

pub async fn carbon_savings(Extension(service): Extension<SharedService>) -> axum::response::Response {
    match service.carbon_savings_summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn suggest_alternatives(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
) -> axum::response::Response {
    match service.suggest_alternatives(&material) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
