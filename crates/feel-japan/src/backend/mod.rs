//! Adapters for the hosted backend: a PostgREST client for production and an
//! in-memory store used in demo mode and tests.
//!
//! The store traits themselves live next to the domain that consumes them
//! (`brochures::BrochureStore`, `agents::ProfileStore`,
//! `inquiries::InquiryStore`).

mod memory;
mod postgrest;

pub use memory::InMemoryBackend;
pub use postgrest::PostgrestClient;

/// PostgREST/Postgres error code for an unknown column.
pub const UNDEFINED_COLUMN: &str = "42703";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend rejected request ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected backend payload: {0}")]
    Decode(String),
    #[error("record not found")]
    NotFound,
}

impl BackendError {
    /// Database error code reported by the backend, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
