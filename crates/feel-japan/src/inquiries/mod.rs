//! Inquiry intake from travel agents, notification e-mails, and the
//! communication log.

pub mod domain;
pub mod export;
pub mod notify;
pub mod router;
pub mod service;
pub mod templates;

use async_trait::async_trait;

use crate::backend::BackendError;

pub use domain::{Communication, DeliveryStatus, Direction, Inquiry, InquiryDetails};
pub use export::inquiries_csv;
pub use notify::{DisabledMailer, MailError, Mailer, OutboundEmail, ResendMailer};
pub use router::inquiry_router;
pub use service::InquiryService;

#[async_trait]
pub trait InquiryStore: Send + Sync {
    /// Stores a validated submission with `motac_verified = false`.
    async fn insert_inquiry(&self, details: &InquiryDetails) -> Result<Inquiry, BackendError>;
    async fn log_communication(&self, entry: &Communication) -> Result<(), BackendError>;
    /// All inquiries, newest first.
    async fn inquiries(&self) -> Result<Vec<Inquiry>, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InquiryError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to render export: {0}")]
    Export(#[from] csv::Error),
}
