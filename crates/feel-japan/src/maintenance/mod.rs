//! One-shot maintenance tasks run from the ops CLI: version releases and
//! backend schema checks.

pub mod changelog;
pub mod git;
pub mod manifest;
pub mod release;
pub mod schema;
pub mod version;

use std::path::{Path, PathBuf};

pub use git::{GitCli, VersionControl};
pub use manifest::Manifest;
pub use release::{run_release, synthesize_message, ReleaseOptions, ReleaseOutcome, ReleaseSummary};
pub use schema::{verify_campaign_columns, SchemaReport, CAMPAIGN_COLUMNS};
pub use version::{BumpKind, Version};

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Manifest(String),
    #[error("invalid version '{0}', expected major.minor.patch")]
    InvalidVersion(String),
    #[error("{0}")]
    Git(String),
}

impl ReleaseError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
