use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session returned by a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub identities: Vec<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub provider: String,
    #[serde(default)]
    pub identity_data: Map<String, Value>,
}

impl AuthUser {
    /// Invited agents carry their agency details in the signup metadata.
    pub fn is_new_signup(&self) -> bool {
        self.user_metadata.contains_key("agency_name")
    }

    pub fn has_password(&self) -> bool {
        self.identities.iter().any(|identity| {
            identity.provider == "email"
                && identity.identity_data.get("has_password") == Some(&Value::Bool(true))
        })
    }

    pub fn needs_password_setup(&self) -> bool {
        self.is_new_signup() && !self.has_password()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth provider unreachable: {0}")]
    Transport(String),
    #[error("auth provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected auth provider payload: {0}")]
    Decode(String),
    #[error("auth provider is not configured")]
    NotConfigured,
}

/// Hosted identity provider operations used by the callback and profile routes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

/// Stand-in used when no backend is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAuthProvider;

#[async_trait]
impl AuthProvider for DisabledAuthProvider {
    async fn exchange_code_for_session(
        &self,
        _code: &str,
        _code_verifier: Option<&str>,
    ) -> Result<Session, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn get_user(&self, _access_token: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::NotConfigured)
    }
}
