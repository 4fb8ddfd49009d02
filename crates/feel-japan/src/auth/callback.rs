use std::sync::Arc;

use tracing::{info, warn};

use super::provider::{AuthError, AuthProvider};
use crate::config::AppEnvironment;

pub const AUTH_ERROR_PATH: &str = "/auth/auth-error";
pub const PASSWORD_SETUP_PATH: &str = "/agent/setup-password";

/// Inputs of one callback invocation, already lifted off the HTTP request.
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    pub code: Option<String>,
    pub next: Option<String>,
    /// Origin of the incoming request, e.g. `https://portal.example.my`.
    pub origin: String,
    pub forwarded_host: Option<String>,
    pub code_verifier: Option<String>,
}

#[derive(Debug)]
pub enum CallbackFailure {
    MissingCode,
    Exchange(AuthError),
}

#[derive(Debug)]
pub enum CallbackOutcome {
    Authenticated { location: String },
    PasswordSetupRequired { location: String },
    Failed {
        location: String,
        reason: CallbackFailure,
    },
}

impl CallbackOutcome {
    pub fn location(&self) -> &str {
        match self {
            CallbackOutcome::Authenticated { location }
            | CallbackOutcome::PasswordSetupRequired { location }
            | CallbackOutcome::Failed { location, .. } => location,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, CallbackOutcome::Failed { .. })
    }
}

/// Exchanges the authorization code and decides where the browser lands next.
/// Every invocation makes exactly one exchange attempt.
#[derive(Clone)]
pub struct AuthCallback {
    provider: Arc<dyn AuthProvider>,
    environment: AppEnvironment,
}

impl AuthCallback {
    pub fn new(provider: Arc<dyn AuthProvider>, environment: AppEnvironment) -> Self {
        Self {
            provider,
            environment,
        }
    }

    pub async fn resolve(&self, request: CallbackRequest) -> CallbackOutcome {
        let failure_location = format!("{}{}", request.origin, AUTH_ERROR_PATH);

        let Some(code) = request.code.as_deref().filter(|code| !code.is_empty()) else {
            return CallbackOutcome::Failed {
                location: failure_location,
                reason: CallbackFailure::MissingCode,
            };
        };

        let session = match self
            .provider
            .exchange_code_for_session(code, request.code_verifier.as_deref())
            .await
        {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "authorization code exchange failed");
                return CallbackOutcome::Failed {
                    location: failure_location,
                    reason: CallbackFailure::Exchange(err),
                };
            }
        };

        match self.provider.get_user(&session.access_token).await {
            Ok(user) if user.needs_password_setup() => {
                info!(user_id = %user.id, "new agent signup, redirecting to password setup");
                return CallbackOutcome::PasswordSetupRequired {
                    location: format!("{}{}", request.origin, PASSWORD_SETUP_PATH),
                };
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "session established but user lookup failed"),
        }

        let next = sanitize_next(request.next.as_deref());
        let location = redirect_target(
            self.environment,
            &request.origin,
            request.forwarded_host.as_deref(),
            &next,
        );
        CallbackOutcome::Authenticated { location }
    }
}

/// Keeps `next` a site-relative path so the redirect cannot leave the origin.
/// Control characters never make it into the `Location` header.
pub fn sanitize_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Prefers the externally visible host when a proxy forwarded one, except in
/// local development where the request origin is authoritative.
pub fn redirect_target(
    environment: AppEnvironment,
    origin: &str,
    forwarded_host: Option<&str>,
    next: &str,
) -> String {
    if environment.is_development() {
        return format!("{origin}{next}");
    }

    match forwarded_host.map(str::trim).filter(|host| !host.is_empty()) {
        Some(host) => format!("https://{host}{next}"),
        None => format!("{origin}{next}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_site_relative() {
        assert_eq!(sanitize_next(None), "/");
        assert_eq!(sanitize_next(Some("/#collections")), "/#collections");
        assert_eq!(sanitize_next(Some("//evil.example")), "/");
        assert_eq!(sanitize_next(Some("evil.example")), "/");
        assert_eq!(sanitize_next(Some("/\\evil.example")), "/");
        assert_eq!(sanitize_next(Some("/inquire\r\nSet-Cookie: x=1")), "/");
        assert_eq!(sanitize_next(Some("/inquire\u{0}")), "/");
    }

    #[test]
    fn forwarded_host_used_outside_development() {
        let origin = "http://10.0.0.4:3000";
        assert_eq!(
            redirect_target(
                AppEnvironment::Production,
                origin,
                Some("portal.feeljapan.my"),
                "/inquire"
            ),
            "https://portal.feeljapan.my/inquire"
        );
        assert_eq!(
            redirect_target(
                AppEnvironment::Development,
                origin,
                Some("portal.feeljapan.my"),
                "/inquire"
            ),
            "http://10.0.0.4:3000/inquire"
        );
        assert_eq!(
            redirect_target(AppEnvironment::Production, origin, None, "/"),
            "http://10.0.0.4:3000/"
        );
    }
}
