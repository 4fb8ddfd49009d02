use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use feel_japan::backend::{BackendError, InMemoryBackend};
use feel_japan::config::MailConfig;
use feel_japan::inquiries::{
    inquiry_router, Communication, DeliveryStatus, Direction, Inquiry, InquiryDetails,
    InquiryService, InquiryStore, MailError, Mailer, OutboundEmail,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Accepts mail for everyone except the addresses it was told to bounce.
#[derive(Default)]
struct FakeMailer {
    bounce: Vec<String>,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl FakeMailer {
    fn bouncing(address: &str) -> Self {
        Self {
            bounce: vec![address.to_string()],
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        if self.bounce.contains(&email.to) {
            return Err(MailError::Rejected {
                status: 422,
                message: "recipient rejected".to_string(),
            });
        }
        let mut sent = self.sent.lock().expect("sent mutex poisoned");
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

/// Store whose writes never reach the database.
struct UnavailableStore;

#[async_trait]
impl InquiryStore for UnavailableStore {
    async fn insert_inquiry(&self, _details: &InquiryDetails) -> Result<Inquiry, BackendError> {
        Err(BackendError::Transport("connection reset".to_string()))
    }

    async fn log_communication(&self, _entry: &Communication) -> Result<(), BackendError> {
        Err(BackendError::Transport("connection reset".to_string()))
    }

    async fn inquiries(&self) -> Result<Vec<Inquiry>, BackendError> {
        Err(BackendError::Transport("connection reset".to_string()))
    }
}

fn mail_config() -> MailConfig {
    MailConfig {
        api_key: None,
        from_address: "Feel Japan with K <onboarding@resend.dev>".to_string(),
        support_address: "support@feeljapanwithk.com".to_string(),
    }
}

fn app(backend: InMemoryBackend, mailer: Arc<FakeMailer>) -> Router {
    inquiry_router(InquiryService::new(Arc::new(backend), mailer, &mail_config()))
}

fn submission() -> Value {
    json!({
        "agency_name": "Sakura Travel Sdn Bhd",
        "license_number": "KPK/LN 9876",
        "name": "Aisyah Rahman",
        "email": "aisyah@sakuratravel.my",
        "phone": "+60 12-345 6789",
        "pax": "12",
        "adults": 10,
        "children_6_11": "2",
        "infants_under_6": "",
        "travel_dates": "2026-11-20 to 2026-11-27",
        "package_slug": "FITOSKSUMMER26.html",
        "places_of_visit": ["Osaka", "Kyoto", "Nara"],
        "newsletter_optin": true
    })
}

async fn post(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/api/inquire")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn inquiry_is_stored_and_both_emails_are_logged() {
    let backend = InMemoryBackend::new();
    let mailer = Arc::new(FakeMailer::default());

    let (status, body) = post(app(backend.clone(), mailer.clone()), submission().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let inquiry_id = body["inquiryId"].as_str().expect("inquiry id").to_string();

    let stored = backend.inquiries().await.expect("inquiries");
    assert_eq!(stored.len(), 1);
    let inquiry = &stored[0];
    assert_eq!(inquiry.id, inquiry_id);
    assert!(!inquiry.motac_verified);
    assert_eq!(inquiry.details.pax, Some(12));
    assert_eq!(inquiry.details.infants_under_6, None);
    assert_eq!(inquiry.details.places_of_visit.as_deref(), Some("Osaka, Kyoto, Nara"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "support@feeljapanwithk.com");
    assert_eq!(
        sent[0].subject,
        "New B2B Inquiry: Sakura Travel Sdn Bhd - Aisyah Rahman"
    );
    assert_eq!(sent[1].to, "aisyah@sakuratravel.my");
    assert!(sent[1].subject.starts_with("Inquiry Confirmed: Feel Japan with K Bespoke (Ref: "));

    let log = backend.communications();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].direction, Direction::Internal);
    assert_eq!(log[0].provider_id.as_deref(), Some("msg-1"));
    assert_eq!(log[1].direction, Direction::Outbound);
    assert!(log.iter().all(|entry| entry.status == DeliveryStatus::Sent));
    assert!(log.iter().all(|entry| entry.inquiry_id == inquiry_id));
}

#[tokio::test]
async fn delivery_failure_is_logged_and_submission_still_succeeds() {
    let backend = InMemoryBackend::new();
    let mailer = Arc::new(FakeMailer::bouncing("aisyah@sakuratravel.my"));

    let (status, body) = post(app(backend.clone(), mailer.clone()), submission().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert_eq!(mailer.sent().len(), 1);
    let log = backend.communications();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].status, DeliveryStatus::Sent);
    assert_eq!(log[1].status, DeliveryStatus::Failed);
    assert_eq!(log[1].provider_id, None);
    assert!(log[1]
        .error_message
        .as_deref()
        .expect("error message")
        .contains("recipient rejected"));
}

#[tokio::test]
async fn missing_contact_fields_are_rejected_before_storage() {
    let backend = InMemoryBackend::new();
    let mailer = Arc::new(FakeMailer::default());

    let mut body = submission();
    body["phone"] = json!("   ");
    let (status, response) = post(app(backend.clone(), mailer.clone()), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "phone is required");

    let mut body = submission();
    body["email"] = json!("not-an-address");
    let (status, _) = post(app(backend.clone(), mailer.clone()), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(app(backend.clone(), mailer.clone()), "{\"name\":".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(backend.inquiries().await.expect("inquiries").is_empty());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn storage_failure_is_a_server_error_and_sends_no_mail() {
    let mailer = Arc::new(FakeMailer::default());
    let app = inquiry_router(InquiryService::new(
        Arc::new(UnavailableStore),
        mailer.clone(),
        &mail_config(),
    ));

    let (status, body) = post(app, submission().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("connection reset"));
    assert!(mailer.sent().is_empty());
}
