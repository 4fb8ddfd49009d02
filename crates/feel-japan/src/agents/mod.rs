//! Travel-agent profiles linked to authenticated users.

pub mod router;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::backend::BackendError;

pub use router::{agent_router, AgentContextView, AgentState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl AgentProfile {
    pub fn is_onboarded(&self) -> bool {
        self.agency_name
            .as_deref()
            .map_or(false, |name| !name.trim().is_empty())
    }
}

/// Agency details submitted during onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    pub agency_name: String,
    pub license_number: String,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<AgentProfile>, BackendError>;
    async fn upsert_profile(&self, profile: AgentProfile) -> Result<AgentProfile, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Clone)]
pub struct AgentDirectory {
    store: Arc<dyn ProfileStore>,
}

impl AgentDirectory {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<AgentProfile>, AgentError> {
        Ok(self.store.profile(user_id).await?)
    }

    /// Profile lookup for display purposes; failures read as "no profile".
    pub async fn profile_or_none(&self, user_id: &str) -> Option<AgentProfile> {
        match self.profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                error!(%user_id, error = %err, "failed to fetch agent profile");
                None
            }
        }
    }

    /// Records agency details for a user. Verification is always reset; it is
    /// granted manually after the license check.
    pub async fn onboard(
        &self,
        user_id: &str,
        email: Option<String>,
        request: OnboardingRequest,
    ) -> Result<AgentProfile, AgentError> {
        let agency_name = request.agency_name.trim();
        if agency_name.is_empty() {
            return Err(AgentError::MissingField("agency_name"));
        }
        let license_number = request.license_number.trim();
        if license_number.is_empty() {
            return Err(AgentError::MissingField("license_number"));
        }

        let existing = self.store.profile(user_id).await?;
        let profile = AgentProfile {
            id: user_id.to_string(),
            email: email.or_else(|| existing.as_ref().and_then(|p| p.email.clone())),
            agency_name: Some(agency_name.to_string()),
            license_number: Some(license_number.to_string()),
            is_verified: false,
            is_admin: existing.map_or(false, |p| p.is_admin),
        };

        Ok(self.store.upsert_profile(profile).await?)
    }
}
