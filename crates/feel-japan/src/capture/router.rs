use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::AppError;

use super::artifact::artifact_path;
use super::job::JobId;
use super::queue::CaptureQueue;
use super::slug::{normalize_slug, parse_trigger_slug};
use super::CaptureError;

#[derive(Debug, Default, Deserialize)]
pub struct CaptureTrigger {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
}

pub fn capture_router(queue: CaptureQueue) -> Router {
    Router::new()
        .route("/api/brochure/capture", post(trigger_handler))
        .route("/api/brochure/capture/jobs/:id", get(job_handler))
        .route("/brochures/:slug/pdf", get(artifact_handler))
        .with_state(queue)
}

pub(crate) async fn trigger_handler(
    State(queue): State<CaptureQueue>,
    payload: Result<Json<CaptureTrigger>, JsonRejection>,
) -> Response {
    let trigger = match payload {
        Ok(Json(trigger)) => trigger,
        Err(rejection) => {
            let payload = json!({ "error": rejection.body_text() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let slug = match parse_trigger_slug(trigger.slug.as_deref()) {
        Ok(slug) => slug,
        Err(err) => return capture_error_response(err),
    };

    match queue.submit(slug, trigger.force.unwrap_or(true)) {
        Ok(submission) => {
            let job = submission.job;
            info!(job = %job.id, slug = %job.slug, coalesced = submission.coalesced, "capture triggered");
            let message = if submission.coalesced {
                "PDF regeneration already queued"
            } else {
                "PDF regeneration triggered in background"
            };
            let payload = json!({
                "success": true,
                "message": message,
                "job_id": job.id,
                "status": job.status,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => capture_error_response(err),
    }
}

pub(crate) async fn job_handler(
    State(queue): State<CaptureQueue>,
    Path(id): Path<String>,
) -> Response {
    match JobId::parse(&id).and_then(|id| queue.job(id)) {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => {
            let payload = json!({ "error": format!("capture job '{id}' not found") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn artifact_handler(
    State(queue): State<CaptureQueue>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let slug = normalize_slug(&slug);
    let path = artifact_path(queue.output_dir(), &slug);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let payload = json!({ "error": format!("no PDF has been generated for '{slug}'") });
            return Ok((StatusCode::NOT_FOUND, Json(payload)).into_response());
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to read brochure artifact");
            return Err(AppError::from(err));
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.essence_str().to_string())],
        bytes,
    )
        .into_response())
}

fn capture_error_response(err: CaptureError) -> Response {
    let status = match err {
        CaptureError::MissingSlug | CaptureError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
        CaptureError::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
        CaptureError::QueueClosed => {
            error!("capture queue closed while accepting triggers");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
