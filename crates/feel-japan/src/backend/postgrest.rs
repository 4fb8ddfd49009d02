use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::BackendError;
use crate::agents::{AgentProfile, ProfileStore};
use crate::brochures::{BrochureRow, BrochureStore};
use crate::inquiries::{Communication, Inquiry, InquiryDetails, InquiryStore};

const BROCHURES: &str = "brochures";
const AGENT_PROFILES: &str = "agent_profiles";
const INQUIRIES: &str = "inquiries";
const INQUIRY_COMMUNICATIONS: &str = "inquiry_communications";

/// Client for the hosted backend's PostgREST interface (`/rest/v1`).
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    rest_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PostgrestClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.message.unwrap_or(text)),
            Err(_) => (None, text),
        };
        Err(BackendError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[async_trait]
impl BrochureStore for PostgrestClient {
    async fn listed_brochures(&self, today: NaiveDate) -> Result<Vec<BrochureRow>, BackendError> {
        debug!(%today, "fetching listed brochures");
        let listed = format!(
            "(or(is_archived.is.null,is_archived.eq.false),or(campaign_end.is.null,campaign_end.gte.{today}))"
        );
        let request = self.request(Method::GET, BROCHURES).query(&[
            ("select", "*"),
            ("and", listed.as_str()),
            ("order", "created_at.asc"),
        ]);
        Self::fetch(request).await
    }

    async fn brochure_by_slug(&self, slug: &str) -> Result<Option<BrochureRow>, BackendError> {
        let filter = format!("eq.{slug}");
        let request = self.request(Method::GET, BROCHURES).query(&[
            ("select", "*"),
            ("slug", filter.as_str()),
            ("limit", "1"),
        ]);
        let rows: Vec<BrochureRow> = Self::fetch(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn probe_columns(&self, columns: &[&str]) -> Result<(), BackendError> {
        let select = columns.join(",");
        let request = self
            .request(Method::GET, BROCHURES)
            .query(&[("select", select.as_str()), ("limit", "1")]);
        Self::send(request).await.map(|_| ())
    }
}

#[async_trait]
impl ProfileStore for PostgrestClient {
    async fn profile(&self, user_id: &str) -> Result<Option<AgentProfile>, BackendError> {
        let filter = format!("eq.{user_id}");
        let request = self
            .request(Method::GET, AGENT_PROFILES)
            .query(&[("select", "*"), ("id", filter.as_str()), ("limit", "1")]);
        let rows: Vec<AgentProfile> = Self::fetch(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, profile: AgentProfile) -> Result<AgentProfile, BackendError> {
        let request = self
            .request(Method::POST, AGENT_PROFILES)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&profile);
        let rows: Vec<AgentProfile> = Self::fetch(request).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }
}

#[async_trait]
impl InquiryStore for PostgrestClient {
    async fn insert_inquiry(&self, details: &InquiryDetails) -> Result<Inquiry, BackendError> {
        let mut row =
            serde_json::to_value(details).map_err(|err| BackendError::Decode(err.to_string()))?;
        if let Some(columns) = row.as_object_mut() {
            columns.insert("motac_verified".to_string(), Value::Bool(false));
        }

        let request = self
            .request(Method::POST, INQUIRIES)
            .header("Prefer", "return=representation")
            .json(&row);
        let rows: Vec<Inquiry> = Self::fetch(request).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    async fn log_communication(&self, entry: &Communication) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, INQUIRY_COMMUNICATIONS)
            .header("Prefer", "return=minimal")
            .json(entry);
        Self::send(request).await.map(|_| ())
    }

    async fn inquiries(&self) -> Result<Vec<Inquiry>, BackendError> {
        let request = self
            .request(Method::GET, INQUIRIES)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        Self::fetch(request).await
    }
}
