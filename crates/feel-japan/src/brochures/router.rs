use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::service::BrochureService;

/// Public catalog endpoints.
pub fn brochure_router(service: BrochureService) -> Router {
    Router::new()
        .route("/api/v1/brochures", get(list_handler))
        .route("/api/v1/brochures/:slug", get(detail_handler))
        .with_state(service)
}

pub(crate) async fn list_handler(State(service): State<BrochureService>) -> Response {
    let brochures = service.brochures().await;
    (StatusCode::OK, Json(brochures)).into_response()
}

pub(crate) async fn detail_handler(
    State(service): State<BrochureService>,
    Path(slug): Path<String>,
) -> Response {
    match service.brochure_by_slug(&slug).await {
        Some(brochure) => (StatusCode::OK, Json(brochure)).into_response(),
        None => {
            let payload = json!({ "error": format!("brochure '{slug}' not found") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}
