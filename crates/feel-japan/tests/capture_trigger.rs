use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use feel_japan::capture::{
    capture_router, CaptureQueue, CaptureReport, CaptureRequest, CaptureRunError, CaptureRunner,
};
use feel_japan::config::CaptureConfig;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Writes a tiny PDF where the queue asks for the artifact.
#[derive(Default)]
struct RecordingRunner {
    requests: Mutex<Vec<CaptureRequest>>,
}

impl RecordingRunner {
    fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl CaptureRunner for RecordingRunner {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReport, CaptureRunError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());
        if let Some(parent) = request.artifact.parent() {
            std::fs::create_dir_all(parent).map_err(|err| CaptureRunError::Spawn(err.to_string()))?;
        }
        std::fs::write(&request.artifact, b"%PDF-1.4\n%test\n")
            .map_err(|err| CaptureRunError::Spawn(err.to_string()))?;
        Ok(CaptureReport {
            stdout: format!("captured {}", request.slug),
        })
    }
}

fn queue(runner: Arc<RecordingRunner>, output_dir: &Path) -> CaptureQueue {
    let config = CaptureConfig {
        command: vec!["true".to_string()],
        output_dir: output_dir.to_path_buf(),
        workers: 1,
        queue_capacity: 8,
        timeout: Duration::from_secs(5),
    };
    CaptureQueue::start(runner, &config)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec())
}

fn trigger(body: Value) -> Request<Body> {
    Request::post("/api/brochure/capture")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn wait_for_job(app: &Router, id: &str) -> Value {
    for _ in 0..100 {
        let (status, body) = send(
            app.clone(),
            Request::get(format!("/api/brochure/capture/jobs/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let job: Value = serde_json::from_slice(&body).expect("job json");
        if job["status"] == "done" || job["status"] == "failed" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("capture job {id} did not finish");
}

#[tokio::test]
async fn missing_or_unsafe_slug_is_rejected_without_running_a_capture() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = Arc::new(RecordingRunner::default());
    let app = capture_router(queue(runner.clone(), dir.path()));

    let (status, body) = send(app.clone(), trigger(json!({ "force": true }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(body["error"], "Slug is required");

    let (status, _) = send(app.clone(), trigger(json!({ "slug": "  /brochures/ " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app.clone(), trigger(json!({ "slug": "../etc/passwd" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app,
        Request::post("/api/brochure/capture")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(runner.requests().is_empty());
}

#[tokio::test]
async fn trigger_normalizes_slug_and_serves_the_generated_pdf() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = Arc::new(RecordingRunner::default());
    let app = capture_router(queue(runner.clone(), dir.path()));

    let (status, _) = send(
        app.clone(),
        Request::get("/brochures/FITOSKSUMMER26.html/pdf")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app.clone(),
        trigger(json!({ "slug": "/brochures/FITOSKSUMMER26.html" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "PDF regeneration triggered in background");
    let job_id = body["job_id"].as_str().expect("job id").to_string();

    let job = wait_for_job(&app, &job_id).await;
    assert_eq!(job["status"], "done");
    assert_eq!(job["slug"], "FITOSKSUMMER26.html");
    assert_eq!(job["force"], true);

    let requests = runner.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].slug, "FITOSKSUMMER26.html");
    assert_eq!(
        requests[0].artifact,
        dir.path().join("fit_-FITOSKSUMMER26.html.pdf")
    );

    let response = app
        .oneshot(
            Request::get("/brochures/FITOSKSUMMER26.html/pdf")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn explicit_force_false_reaches_the_runner() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = Arc::new(RecordingRunner::default());
    let app = capture_router(queue(runner.clone(), dir.path()));

    let (status, body) = send(
        app.clone(),
        trigger(json!({ "slug": "git-hokkaido", "force": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).expect("json");
    let job = wait_for_job(&app, body["job_id"].as_str().expect("job id")).await;

    assert_eq!(job["force"], false);
    assert!(!runner.requests()[0].force);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = capture_router(queue(Arc::new(RecordingRunner::default()), dir.path()));

    for id in ["not-a-uuid", "9b7c1c8e-2d4f-4b8a-9f57-0a6c3e1d2b44"] {
        let (status, _) = send(
            app.clone(),
            Request::get(format!("/api/brochure/capture/jobs/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn unreadable_artifact_is_a_server_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("fit_-FITOSKSUMMER26.html.pdf")).expect("blocking dir");
    let app = capture_router(queue(Arc::new(RecordingRunner::default()), dir.path()));

    let (status, body) = send(
        app,
        Request::get("/brochures/FITOSKSUMMER26.html/pdf")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).expect("json");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .starts_with("io error"));
}
