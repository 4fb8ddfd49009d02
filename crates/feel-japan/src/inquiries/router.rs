use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::InquiryDetails;
use super::service::InquiryService;
use super::InquiryError;

pub fn inquiry_router(service: InquiryService) -> Router {
    Router::new()
        .route("/api/inquire", post(submit_handler))
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<InquiryService>,
    payload: Result<Json<InquiryDetails>, JsonRejection>,
) -> Response {
    let details = match payload {
        Ok(Json(details)) => details,
        Err(rejection) => {
            let payload = json!({ "error": rejection.body_text() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.submit(details).await {
        Ok(inquiry) => (
            StatusCode::OK,
            Json(json!({ "success": true, "inquiryId": inquiry.id })),
        )
            .into_response(),
        Err(err @ (InquiryError::MissingField(_) | InquiryError::InvalidEmail(_))) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(err) => {
            error!(error = %err, "inquiry submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
