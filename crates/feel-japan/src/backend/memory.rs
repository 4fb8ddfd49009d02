use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{BackendError, UNDEFINED_COLUMN};
use crate::agents::{AgentProfile, ProfileStore};
use crate::brochures::{BrochureRow, BrochureStore};
use crate::inquiries::{Communication, Inquiry, InquiryDetails, InquiryStore};

const BROCHURE_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "image",
    "category",
    "city",
    "title",
    "subtitle",
    "summary",
    "tags",
    "highlights",
    "itinerary",
    "pricing",
    "inclusions",
    "exclusions",
    "payment_terms",
    "created_at",
    "is_archived",
    "campaign_start",
    "campaign_end",
    "show_pricing",
    "pdf_last_generated_at",
    "thumbnail_url",
];

#[derive(Default)]
struct Tables {
    brochures: Vec<BrochureRow>,
    profiles: HashMap<String, AgentProfile>,
    inquiries: Vec<Inquiry>,
    communications: Vec<Communication>,
    dropped_columns: Vec<String>,
}

/// Process-local backend used in demo mode and tests.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brochures(rows: impl IntoIterator<Item = BrochureRow>) -> Self {
        let backend = Self::new();
        for row in rows {
            backend.add_brochure(row);
        }
        backend
    }

    pub fn add_brochure(&self, row: BrochureRow) {
        self.lock().brochures.push(row);
    }

    /// Simulates a collection that predates the given columns.
    pub fn drop_column(&self, column: &str) {
        self.lock().dropped_columns.push(column.to_string());
    }

    pub fn communications(&self) -> Vec<Communication> {
        self.lock().communications.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("backend mutex poisoned")
    }
}

#[async_trait]
impl BrochureStore for InMemoryBackend {
    async fn listed_brochures(&self, today: NaiveDate) -> Result<Vec<BrochureRow>, BackendError> {
        let tables = self.lock();
        let mut rows: Vec<BrochureRow> = tables
            .brochures
            .iter()
            .filter(|row| row.is_listed(today))
            .cloned()
            .collect();
        rows.sort_by_key(|row| {
            let created_at = row.created_at();
            (created_at.is_none(), created_at)
        });
        Ok(rows)
    }

    async fn brochure_by_slug(&self, slug: &str) -> Result<Option<BrochureRow>, BackendError> {
        let tables = self.lock();
        Ok(tables.brochures.iter().find(|row| row.slug == slug).cloned())
    }

    async fn probe_columns(&self, columns: &[&str]) -> Result<(), BackendError> {
        let tables = self.lock();
        let missing = columns.iter().copied().find(|column| {
            !BROCHURE_COLUMNS.contains(column)
                || tables.dropped_columns.iter().any(|dropped| dropped == column)
        });

        match missing {
            Some(column) => Err(BackendError::Api {
                status: 400,
                code: Some(UNDEFINED_COLUMN.to_string()),
                message: format!("column brochures.{column} does not exist"),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryBackend {
    async fn profile(&self, user_id: &str) -> Result<Option<AgentProfile>, BackendError> {
        Ok(self.lock().profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: AgentProfile) -> Result<AgentProfile, BackendError> {
        self.lock()
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl InquiryStore for InMemoryBackend {
    async fn insert_inquiry(&self, details: &InquiryDetails) -> Result<Inquiry, BackendError> {
        let inquiry = Inquiry {
            id: Uuid::new_v4().to_string(),
            created_at: Some(Utc::now()),
            motac_verified: false,
            details: details.clone(),
        };
        self.lock().inquiries.push(inquiry.clone());
        Ok(inquiry)
    }

    async fn log_communication(&self, entry: &Communication) -> Result<(), BackendError> {
        let mut tables = self.lock();
        if !tables.inquiries.iter().any(|inquiry| inquiry.id == entry.inquiry_id) {
            return Err(BackendError::NotFound);
        }
        tables.communications.push(entry.clone());
        Ok(())
    }

    async fn inquiries(&self) -> Result<Vec<Inquiry>, BackendError> {
        let mut inquiries: Vec<Inquiry> = self.lock().inquiries.iter().rev().cloned().collect();
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inquiries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(slug: &str, created_at: &str, extra: serde_json::Value) -> BrochureRow {
        let mut value = json!({ "slug": slug, "created_at": created_at });
        if let (Some(target), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(value).expect("row")
    }

    #[tokio::test]
    async fn listed_brochures_skip_archived_and_expired_rows() {
        let backend = InMemoryBackend::with_brochures([
            row("late", "2026-02-01T00:00:00Z", json!({})),
            row("archived", "2026-01-01T00:00:00Z", json!({ "is_archived": true })),
            row("expired", "2026-01-02T00:00:00Z", json!({ "campaign_end": "2026-05-31" })),
            row("early", "2026-01-03T00:00:00Z", json!({ "campaign_end": "2026-06-01" })),
        ]);
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).expect("date");

        let slugs: Vec<String> = backend
            .listed_brochures(today)
            .await
            .expect("listed")
            .into_iter()
            .map(|row| row.slug)
            .collect();
        assert_eq!(slugs, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn column_check_reports_undefined_column_code() {
        let backend = InMemoryBackend::new();
        backend
            .probe_columns(&["is_archived", "campaign_end"])
            .await
            .expect("columns exist");

        backend.drop_column("campaign_start");
        let err = backend
            .probe_columns(&["is_archived", "campaign_start"])
            .await
            .expect_err("column dropped");
        assert_eq!(err.code(), Some(UNDEFINED_COLUMN));
    }

    #[tokio::test]
    async fn communications_require_a_stored_inquiry() {
        let backend = InMemoryBackend::new();
        let entry = Communication {
            inquiry_id: "missing".into(),
            kind: "email".into(),
            direction: crate::inquiries::Direction::Internal,
            subject: "s".into(),
            content: "c".into(),
            provider_id: None,
            status: crate::inquiries::DeliveryStatus::Sent,
            error_message: None,
        };
        assert!(matches!(
            backend.log_communication(&entry).await,
            Err(BackendError::NotFound)
        ));
    }
}
