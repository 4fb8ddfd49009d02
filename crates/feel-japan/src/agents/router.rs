use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::{AgentDirectory, AgentError, AgentProfile, OnboardingRequest};
use crate::auth::{bearer_token, AuthProvider, AuthUser};

#[derive(Clone)]
pub struct AgentState {
    pub directory: AgentDirectory,
    pub auth: Arc<dyn AuthProvider>,
}

/// Agent context used to prefill the inquiry form.
#[derive(Debug, Serialize)]
pub struct AgentContextView {
    pub user_id: String,
    pub email: Option<String>,
    pub profile: Option<AgentProfile>,
    pub onboarded: bool,
    pub verified: bool,
}

pub fn agent_router(state: AgentState) -> Router {
    Router::new()
        .route(
            "/api/agent/profile",
            get(profile_handler).put(onboarding_handler),
        )
        .with_state(state)
}

async fn authenticated_user(state: &AgentState, headers: &HeaderMap) -> Result<AuthUser, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(unauthorized("missing bearer token"));
    };

    state.auth.get_user(token).await.map_err(|err| {
        warn!(error = %err, "agent token rejected");
        unauthorized("invalid or expired session")
    })
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn profile_handler(
    State(state): State<AgentState>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticated_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let profile = state.directory.profile_or_none(&user.id).await;
    let view = AgentContextView {
        onboarded: profile.as_ref().map_or(false, AgentProfile::is_onboarded),
        verified: profile.as_ref().map_or(false, |p| p.is_verified),
        user_id: user.id,
        email: user.email,
        profile,
    };

    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn onboarding_handler(
    State(state): State<AgentState>,
    headers: HeaderMap,
    Json(request): Json<OnboardingRequest>,
) -> Response {
    let user = match authenticated_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.directory.onboard(&user.id, user.email, request).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err @ AgentError::MissingField(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
