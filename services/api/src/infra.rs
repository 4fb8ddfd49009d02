use feel_japan::agents::{AgentDirectory, AgentState, ProfileStore};
use feel_japan::auth::{
    AuthCallback, AuthProvider, CallbackState, DisabledAuthProvider, SupabaseAuthClient,
};
use feel_japan::backend::{InMemoryBackend, PostgrestClient};
use feel_japan::brochures::{BrochureService, BrochureStore};
use feel_japan::capture::{CaptureQueue, CommandCaptureRunner};
use feel_japan::config::{AppConfig, ConfigError};
use feel_japan::error::AppError;
use feel_japan::inquiries::{DisabledMailer, InquiryService, InquiryStore, Mailer, ResendMailer};
use feel_japan::studio::{StudioGate, StudioState};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the module routers need, wired from configuration.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) brochures: BrochureService,
    pub(crate) agents: AgentState,
    pub(crate) callback: CallbackState,
    pub(crate) capture: CaptureQueue,
    pub(crate) inquiries: InquiryService,
    pub(crate) studio: StudioGate,
}

impl Services {
    pub(crate) fn studio_state(&self) -> StudioState {
        StudioState {
            gate: self.studio.clone(),
            inquiries: self.inquiries.clone(),
            capture: self.capture.clone(),
        }
    }
}

struct Stores {
    brochures: Arc<dyn BrochureStore>,
    profiles: Arc<dyn ProfileStore>,
    inquiries: Arc<dyn InquiryStore>,
    auth: Arc<dyn AuthProvider>,
}

/// Builds adapters for the hosted backend when it is configured and falls back
/// to the in-memory backend otherwise. Must run inside the Tokio runtime since
/// it starts the capture workers.
pub(crate) fn build_services(config: &AppConfig) -> Result<Services, AppError> {
    let stores = build_stores(config)?;

    let mailer: Arc<dyn Mailer> = match config.mail.api_key.as_deref() {
        Some(key) => Arc::new(ResendMailer::new(key)?),
        None => {
            warn!("RESEND_API_KEY not set; inquiry e-mails will be logged as failed");
            Arc::new(DisabledMailer)
        }
    };

    let runner = CommandCaptureRunner::from_config(&config.capture)
        .ok_or(ConfigError::EmptyCaptureCommand)?;
    let capture = CaptureQueue::start(Arc::new(runner), &config.capture);

    Ok(Services {
        brochures: BrochureService::new(stores.brochures),
        agents: AgentState {
            directory: AgentDirectory::new(stores.profiles),
            auth: Arc::clone(&stores.auth),
        },
        callback: CallbackState {
            callback: AuthCallback::new(stores.auth, config.environment),
            public_origin: config.site.public_origin.clone(),
            verifier_cookie: config.site.verifier_cookie.clone(),
        },
        capture,
        inquiries: InquiryService::new(stores.inquiries, mailer, &config.mail),
        studio: StudioGate::from_config(&config.studio),
    })
}

fn build_stores(config: &AppConfig) -> Result<Stores, AppError> {
    let backend = &config.backend;
    match (backend.url.as_deref(), backend.api_key()) {
        (Some(url), Some(key)) => {
            let rest = Arc::new(PostgrestClient::new(url, key)?);
            let auth_key = backend.anon_key.as_deref().unwrap_or(key);
            let auth = Arc::new(SupabaseAuthClient::new(url, auth_key)?);
            Ok(Stores {
                brochures: rest.clone(),
                profiles: rest.clone(),
                inquiries: rest,
                auth,
            })
        }
        _ => {
            warn!("BACKEND_URL or backend key not set; using the in-memory backend");
            let memory = Arc::new(InMemoryBackend::new());
            Ok(Stores {
                brochures: memory.clone(),
                profiles: memory.clone(),
                inquiries: memory,
                auth: Arc::new(DisabledAuthProvider),
            })
        }
    }
}
