use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;

use super::callback::{AuthCallback, CallbackRequest, AUTH_ERROR_PATH};

#[derive(Clone)]
pub struct CallbackState {
    pub callback: AuthCallback,
    /// Fixed public origin; falls back to the `Host` header when unset.
    pub public_origin: Option<String>,
    /// Cookie holding the PKCE code verifier.
    pub verifier_cookie: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackParams {
    code: Option<String>,
    next: Option<String>,
}

pub fn auth_router(state: CallbackState) -> Router {
    Router::new()
        .route("/auth/callback", get(callback_handler))
        .with_state(state)
}

pub(crate) async fn callback_handler(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let origin = state
        .public_origin
        .clone()
        .unwrap_or_else(|| origin_from_headers(&headers));
    let forwarded_host = header_value(&headers, "x-forwarded-host");
    let code_verifier = state
        .verifier_cookie
        .as_deref()
        .and_then(|name| cookie_value(&headers, name));
    let failure_location = format!("{origin}{AUTH_ERROR_PATH}");

    let outcome = state
        .callback
        .resolve(CallbackRequest {
            code: params.code,
            next: params.next,
            origin,
            forwarded_host,
            code_verifier,
        })
        .await;

    redirect_to(outcome.location(), &failure_location)
}

/// 307 to `location`, or to `fallback` when `location` cannot be sent as a
/// header value.
fn redirect_to(location: &str, fallback: &str) -> Response {
    let value = HeaderValue::try_from(location)
        .or_else(|_| {
            warn!(location = %location.escape_debug(), "redirect target rejected");
            HeaderValue::try_from(fallback)
        })
        .unwrap_or_else(|_| HeaderValue::from_static(AUTH_ERROR_PATH));

    (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn origin_from_headers(headers: &HeaderMap) -> String {
    let host = header_value(headers, header::HOST.as_str()).unwrap_or_else(|| "localhost".into());
    format!("http://{host}")
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}
