use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StudioConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Access denied")]
    AccessDenied,
    #[error("studio session is missing or expired")]
    InvalidToken,
}

/// Capability returned after a successful key check.
#[derive(Debug, Clone, Serialize)]
pub struct StudioToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Guards the back office. A correct access key buys a bearer token that is
/// valid until its expiry or until revoked.
#[derive(Clone)]
pub struct StudioGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    access_key: Option<String>,
    ttl: Duration,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl StudioGate {
    pub fn new(access_key: Option<String>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(GateInner {
                access_key: access_key.filter(|key| !key.is_empty()),
                ttl,
                sessions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        let ttl = Duration::from_std(config.token_ttl).unwrap_or_else(|_| Duration::hours(8));
        Self::new(config.access_key.clone(), ttl)
    }

    pub fn issue(&self, presented_key: &str) -> Result<StudioToken, GateError> {
        self.issue_at(presented_key, Utc::now())
    }

    pub fn issue_at(&self, presented_key: &str, now: DateTime<Utc>) -> Result<StudioToken, GateError> {
        let Some(expected) = self.inner.access_key.as_deref() else {
            warn!("studio access attempted without a configured key");
            return Err(GateError::AccessDenied);
        };
        if !ct_eq(presented_key.as_bytes(), expected.as_bytes()) {
            warn!("studio access denied");
            return Err(GateError::AccessDenied);
        }

        let token = StudioToken {
            token: Uuid::new_v4().to_string(),
            expires_at: now + self.inner.ttl,
        };

        let mut sessions = self.lock();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.token.clone(), token.expires_at);
        info!(active_sessions = sessions.len(), "studio session issued");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<DateTime<Utc>, GateError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, GateError> {
        let mut sessions = self.lock();
        match sessions.get(token).copied() {
            Some(expires_at) if expires_at > now => Ok(expires_at),
            Some(_) => {
                sessions.remove(token);
                Err(GateError::InvalidToken)
            }
            None => Err(GateError::InvalidToken),
        }
    }

    /// Returns whether the token was active.
    pub fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.inner.sessions.lock().expect("studio session mutex poisoned")
    }
}

fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
