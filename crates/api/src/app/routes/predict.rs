use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::{SharedService, errors};

/// `GET /predict/{material}`: an unknown material maps to 404, never to a
/// placeholder estimate.
pub async fn predict_usage(
    Extension(service): Extension<SharedService>,
    Path(material): Path<String>,
) -> axum::response::Response {
    match service.predict_usage(&material) {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
