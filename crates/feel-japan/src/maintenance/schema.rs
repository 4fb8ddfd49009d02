use std::fmt;

use crate::backend::UNDEFINED_COLUMN;
use crate::brochures::BrochureStore;

/// Columns the catalog's listing filter depends on.
pub const CAMPAIGN_COLUMNS: [&str; 3] = ["is_archived", "campaign_start", "campaign_end"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReport {
    Verified,
    MissingColumns,
    Failed(String),
}

impl SchemaReport {
    pub fn is_verified(&self) -> bool {
        matches!(self, SchemaReport::Verified)
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = CAMPAIGN_COLUMNS.join(", ");
        match self {
            SchemaReport::Verified => write!(f, "All columns ({columns}) verified successfully."),
            SchemaReport::MissingColumns => {
                write!(f, "One or more columns ({columns}) do not exist.")
            }
            SchemaReport::Failed(message) => write!(f, "Error during verification: {message}"),
        }
    }
}

/// Probes the brochure collection for the campaign columns.
pub async fn verify_campaign_columns(store: &dyn BrochureStore) -> SchemaReport {
    match store.probe_columns(&CAMPAIGN_COLUMNS).await {
        Ok(()) => SchemaReport::Verified,
        Err(err) if err.code() == Some(UNDEFINED_COLUMN) => SchemaReport::MissingColumns,
        Err(err) => SchemaReport::Failed(err.to_string()),
    }
}
