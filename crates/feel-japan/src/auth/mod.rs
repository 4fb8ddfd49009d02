//! Agent authentication: the provider boundary and the login callback flow.

pub mod callback;
pub mod provider;
pub mod router;
mod supabase;

use axum::http::{header, HeaderMap};

pub use callback::{
    AuthCallback, CallbackFailure, CallbackOutcome, CallbackRequest, AUTH_ERROR_PATH,
    PASSWORD_SETUP_PATH,
};
pub use provider::{AuthError, AuthProvider, AuthUser, DisabledAuthProvider, Identity, Session};
pub use router::{auth_router, CallbackState};
pub use supabase::SupabaseAuthClient;

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| {
            raw.strip_prefix("Bearer ")
                .or_else(|| raw.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
