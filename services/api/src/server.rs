use crate::cli::ServeArgs;
use crate::infra::{build_services, AppState};
use crate::routes::application_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use feel_japan::config::AppConfig;
use feel_japan::error::AppError;
use feel_japan::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(workers) = args.capture_workers.take() {
        config.capture.workers = workers;
    }
    if let Some(dir) = args.capture_output.take() {
        config.capture.output_dir = dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = build_services(&config)?;

    let app = application_router(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        capture_workers = config.capture.workers,
        output_dir = %config.capture.output_dir.display(),
        "feel japan portal api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
