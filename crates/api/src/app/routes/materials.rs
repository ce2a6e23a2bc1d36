use axum::{
    Json,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{SharedService, dto, errors};

pub async fn list_materials(Extension(service): Extension<SharedService>) -> axum::response::Response {
    match service.list_materials() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_material(
    Extension(service): Extension<SharedService>,
    Json(body): Json<dto::AddMaterialRequest>,
) -> axum::response::Response {
    match body.into_new_material().and_then(|material| service.intake(material)) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_material(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
) -> axum::response::Response {
    match service.material(&material) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_material(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
) -> axum::response::Response {
    match service.remove_material(&material) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restock(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    match service.restock(&material, body.amount) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn record_usage(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
    Json(body): Json<dto::RecordUsageRequest>,
) -> axum::response::Response {
    let timestamp = body.timestamp.unwrap_or_else(Utc::now);
    match service.record_usage(&material, body.amount, timestamp) {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn export_materials(Extension(service): Extension<SharedService>) -> axum::response::Response {
    match service.export_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=materials_export.csv",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Body is CSV text in the export layout (or any file with the required columns).
pub async fn import_materials(
    Extension(service): Extension<SharedService>,
    body: String,
) -> axum::response::Response {
    match service.import_csv(&body) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
