use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::provider::{AuthError, AuthProvider, AuthUser, Session};

/// REST client for the hosted auth service (`/auth/v1`).
#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuthClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| AuthError::Decode(err.to_string()))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, AuthError> {
        debug!("exchanging authorization code for session");
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.api_key)
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier.unwrap_or_default(),
            }))
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        Self::decode(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        Self::decode(response).await
    }
}
