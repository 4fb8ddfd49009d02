use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRef, FromRequestParts, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::gate::{GateError, StudioGate};
use crate::auth::bearer_token;
use crate::capture::CaptureQueue;
use crate::inquiries::InquiryService;

#[derive(Clone)]
pub struct StudioState {
    pub gate: StudioGate,
    pub inquiries: InquiryService,
    pub capture: CaptureQueue,
}

impl FromRef<StudioState> for StudioGate {
    fn from_ref(state: &StudioState) -> Self {
        state.gate.clone()
    }
}

/// Proof that the request carries a live studio token.
#[derive(Debug, Clone)]
pub struct StudioSession {
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for StudioSession
where
    S: Send + Sync,
    StudioGate: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = StudioGate::from_ref(state);
        let token = bearer_token(&parts.headers).ok_or_else(|| gate_error(GateError::InvalidToken))?;
        gate.verify(token).map_err(gate_error)?;
        Ok(Self {
            token: token.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub access_key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InquiryQuery {
    pub q: Option<String>,
}

pub fn studio_router(state: StudioState) -> Router {
    Router::new()
        .route(
            "/api/studio/session",
            post(open_session_handler).delete(close_session_handler),
        )
        .route("/api/studio/inquiries", get(inquiries_handler))
        .route("/api/studio/inquiries/export", get(export_handler))
        .route("/api/studio/capture/jobs", get(capture_jobs_handler))
        .with_state(state)
}

pub(crate) async fn open_session_handler(
    State(gate): State<StudioGate>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return gate_error(GateError::AccessDenied);
    };

    match gate.issue(&request.access_key) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(err) => gate_error(err),
    }
}

pub(crate) async fn close_session_handler(
    State(gate): State<StudioGate>,
    session: StudioSession,
) -> Response {
    gate.revoke(&session.token);
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn inquiries_handler(
    _session: StudioSession,
    State(state): State<StudioState>,
    Query(query): Query<InquiryQuery>,
) -> Response {
    match state.inquiries.search(query.q.as_deref()).await {
        Ok(inquiries) => (StatusCode::OK, Json(inquiries)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to list inquiries");
            let payload = json!({ "error": "Failed to load inquiries" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn export_handler(
    _session: StudioSession,
    State(state): State<StudioState>,
) -> Response {
    match state.inquiries.export_csv().await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"inquiries.csv\"".to_string(),
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to export inquiries");
            let payload = json!({ "error": "Failed to export inquiries" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn capture_jobs_handler(
    _session: StudioSession,
    State(state): State<StudioState>,
) -> Response {
    (StatusCode::OK, Json(state.capture.jobs())).into_response()
}

fn gate_error(err: GateError) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": err.to_string() }))).into_response()
}
