use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::error;

use super::domain::Brochure;
use super::record::BrochureRow;
use crate::backend::BackendError;

/// Read access to the brochure collection.
#[async_trait]
pub trait BrochureStore: Send + Sync {
    /// Listed rows (see [`BrochureRow::is_listed`]) ordered by creation time.
    async fn listed_brochures(&self, today: NaiveDate) -> Result<Vec<BrochureRow>, BackendError>;
    async fn brochure_by_slug(&self, slug: &str) -> Result<Option<BrochureRow>, BackendError>;
    /// Succeeds when every column exists on the collection.
    async fn probe_columns(&self, columns: &[&str]) -> Result<(), BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BrochureError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Maps stored brochure rows into [`Brochure`] values.
///
/// `list`/`by_slug` surface failures to the caller; `brochures`/`brochure_by_slug`
/// are the fail-soft variants pages use so the catalog renders with degraded
/// content instead of erroring.
#[derive(Clone)]
pub struct BrochureService {
    store: Arc<dyn BrochureStore>,
}

impl BrochureService {
    pub fn new(store: Arc<dyn BrochureStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Brochure>, BrochureError> {
        self.list_on(Local::now().date_naive()).await
    }

    pub async fn list_on(&self, today: NaiveDate) -> Result<Vec<Brochure>, BrochureError> {
        let rows = self.store.listed_brochures(today).await?;
        Ok(rows.into_iter().map(Brochure::from).collect())
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Option<Brochure>, BrochureError> {
        let row = self.store.brochure_by_slug(slug).await?;
        Ok(row
            .filter(|row| row.slug == slug)
            .map(Brochure::from))
    }

    pub async fn brochures(&self) -> Vec<Brochure> {
        match self.list().await {
            Ok(brochures) => brochures,
            Err(err) => {
                error!(error = %err, "failed to fetch brochures");
                Vec::new()
            }
        }
    }

    pub async fn brochure_by_slug(&self, slug: &str) -> Option<Brochure> {
        match self.by_slug(slug).await {
            Ok(brochure) => brochure,
            Err(err) => {
                error!(%slug, error = %err, "failed to fetch brochure");
                None
            }
        }
    }
}
