use crate::auth::AuthError;
use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::inquiries::MailError;
use crate::maintenance::ReleaseError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Backend(BackendError),
    Auth(AuthError),
    Mail(MailError),
    Release(ReleaseError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Backend(err) => write!(f, "backend error: {}", err),
            AppError::Auth(err) => write!(f, "auth error: {}", err),
            AppError::Mail(err) => write!(f, "mail error: {}", err),
            AppError::Release(err) => write!(f, "release error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Backend(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Mail(err) => Some(err),
            AppError::Release(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Backend(BackendError::Transport(_))
            | AppError::Auth(AuthError::Transport(_))
            | AppError::Mail(MailError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Backend(_)
            | AppError::Auth(_)
            | AppError::Mail(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Release(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BackendError> for AppError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<ReleaseError> for AppError {
    fn from(value: ReleaseError) -> Self {
        Self::Release(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<MailError> for AppError {
    fn from(value: MailError) -> Self {
        Self::Mail(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_map_to_bad_gateway() {
        let upstream = AppError::from(MailError::Transport("connection reset".to_string()));
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);

        let rejected = AppError::from(BackendError::Api {
            status: 400,
            code: Some("42703".to_string()),
            message: "column does not exist".to_string(),
        });
        assert_eq!(
            rejected.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_names_the_failing_layer() {
        let err = AppError::from(ConfigError::BackendNotConfigured);
        assert_eq!(
            err.to_string(),
            "configuration error: BACKEND_URL and a backend key are required"
        );
    }
}
