use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Communication, DeliveryStatus, Direction, Inquiry, InquiryDetails};
use super::export::inquiries_csv;
use super::notify::{Mailer, OutboundEmail};
use super::templates::{self, EmailContent};
use super::{InquiryError, InquiryStore};
use crate::config::MailConfig;

/// Accepts inquiries, notifies the team and the submitter, and keeps the
/// communication log.
#[derive(Clone)]
pub struct InquiryService {
    store: Arc<dyn InquiryStore>,
    mailer: Arc<dyn Mailer>,
    from_address: String,
    support_address: String,
}

impl InquiryService {
    pub fn new(store: Arc<dyn InquiryStore>, mailer: Arc<dyn Mailer>, mail: &MailConfig) -> Self {
        Self {
            store,
            mailer,
            from_address: mail.from_address.clone(),
            support_address: mail.support_address.clone(),
        }
    }

    /// Persists the inquiry, then sends both e-mails. Only persistence
    /// failures are returned; delivery problems end up in the log.
    pub async fn submit(&self, details: InquiryDetails) -> Result<Inquiry, InquiryError> {
        let details = details.validated()?;
        let inquiry = self.store.insert_inquiry(&details).await?;
        info!(
            inquiry = %inquiry.id,
            agency = %inquiry.details.agency_name,
            package = inquiry.details.package_slug.as_deref().unwrap_or("custom"),
            "inquiry received"
        );

        let internal = templates::internal_notification(&inquiry);
        self.deliver(&inquiry, Direction::Internal, &self.support_address, internal)
            .await;

        let acknowledgement = templates::acknowledgement(&inquiry);
        self.deliver(
            &inquiry,
            Direction::Outbound,
            &inquiry.details.email,
            acknowledgement,
        )
        .await;

        Ok(inquiry)
    }

    /// Newest first, optionally filtered on name, e-mail or agency.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Inquiry>, InquiryError> {
        let inquiries = self.store.inquiries().await?;
        Ok(match query {
            Some(query) => inquiries
                .into_iter()
                .filter(|inquiry| inquiry.matches(query))
                .collect(),
            None => inquiries,
        })
    }

    pub async fn export_csv(&self) -> Result<Vec<u8>, InquiryError> {
        let inquiries = self.store.inquiries().await?;
        Ok(inquiries_csv(&inquiries)?)
    }

    async fn deliver(
        &self,
        inquiry: &Inquiry,
        direction: Direction,
        to: &str,
        content: EmailContent,
    ) {
        let email = OutboundEmail {
            from: self.from_address.clone(),
            to: to.to_string(),
            subject: content.subject,
            html: content.html,
        };

        let (status, provider_id, error_message) = match self.mailer.send(&email).await {
            Ok(id) => (DeliveryStatus::Sent, Some(id), None),
            Err(err) => {
                warn!(inquiry = %inquiry.id, ?direction, error = %err, "inquiry e-mail failed");
                (DeliveryStatus::Failed, None, Some(err.to_string()))
            }
        };

        let entry = Communication {
            inquiry_id: inquiry.id.clone(),
            kind: "email".to_string(),
            direction,
            subject: email.subject,
            content: email.html,
            provider_id,
            status,
            error_message,
        };
        if let Err(err) = self.store.log_communication(&entry).await {
            warn!(inquiry = %inquiry.id, error = %err, "failed to log inquiry communication");
        }
    }
}
