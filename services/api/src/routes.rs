use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use feel_japan::agents::agent_router;
use feel_japan::auth::auth_router;
use feel_japan::brochures::brochure_router;
use feel_japan::capture::capture_router;
use feel_japan::inquiries::inquiry_router;
use feel_japan::studio::studio_router;
use serde_json::json;

pub(crate) fn application_router(services: Services) -> Router {
    let studio = services.studio_state();

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(brochure_router(services.brochures))
        .merge(capture_router(services.capture))
        .merge(auth_router(services.callback))
        .merge(agent_router(services.agents))
        .merge(inquiry_router(services.inquiries))
        .merge(studio_router(studio))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
