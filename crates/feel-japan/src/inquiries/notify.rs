use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail provider unreachable: {0}")]
    Transport(String),
    #[error("mail provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("mail delivery is not configured")]
    NotConfigured,
}

/// Sends e-mail and returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError>;
}

/// Client for the Resend REST API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: &str) -> Result<Self, MailError> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| MailError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        debug!(to = %email.to, subject = %email.subject, "sending e-mail");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": email.from,
                "to": [email.to],
                "subject": email.subject,
                "html": email.html,
            }))
            .send()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SendResponse>()
            .await
            .map(|body| body.id)
            .map_err(|err| MailError::Transport(err.to_string()))
    }
}

/// Used when no mail API key is configured; every send fails and is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<String, MailError> {
        Err(MailError::NotConfigured)
    }
}
