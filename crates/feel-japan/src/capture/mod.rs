//! On-demand PDF regeneration of brochures through an external capture program.

pub mod artifact;
pub mod job;
pub mod queue;
pub mod router;
pub mod runner;
pub mod slug;

pub use artifact::{artifact_file_name, artifact_path};
pub use job::{CaptureJob, JobId, JobStatus};
pub use queue::{CaptureQueue, Submission};
pub use router::capture_router;
pub use runner::{
    CaptureReport, CaptureRequest, CaptureRunError, CaptureRunner, CommandCaptureRunner,
};
pub use slug::{normalize_slug, parse_trigger_slug};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Slug is required")]
    MissingSlug,
    #[error("invalid brochure slug '{0}'")]
    InvalidSlug(String),
    #[error("capture queue is full, try again shortly")]
    QueueFull,
    #[error("capture queue is not accepting jobs")]
    QueueClosed,
}
