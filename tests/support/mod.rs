#![allow(dead_code)]

//! In-process mock of the research backend for integration tests.
//!
//! Each test scripts the backend's behavior up front (which uploads fail,
//! the sequence of job-status responses, the analysis outcome) and then
//! reads back request accounting: total requests per endpoint plus an
//! in-flight gauge that records whether uploads ever overlapped.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use research_desk::config::AppConfig;
use research_desk::state::AppState;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use url::Url;

/// Scripted behavior and request accounting shared with the handlers
#[derive(Default)]
pub struct BackendState {
    /// File names whose upload should be rejected
    pub fail_upload_files: Mutex<Vec<String>>,
    /// Error text returned for rejected uploads
    pub upload_error: Mutex<String>,
    pub upload_count: AtomicUsize,
    pub uploads_in_flight: AtomicUsize,
    pub max_uploads_in_flight: AtomicUsize,
    /// File names received, in arrival order
    pub uploaded_files: Mutex<Vec<String>>,

    /// Job-status responses handed out in order; exhausted script -> 500
    pub job_script: Mutex<VecDeque<Value>>,
    pub poll_count: AtomicUsize,

    /// Companies returned from the listing endpoint
    pub companies: Mutex<Vec<Value>>,
    pub company_list_count: AtomicUsize,
    /// Optional scripted (status, body) for the single-company endpoint
    pub company_response: Mutex<Option<(u16, Value)>>,

    pub batch_count: AtomicUsize,
    /// Body of the most recent batch-creation request
    pub last_batch_request: Mutex<Option<Value>>,
    pub analyze_count: AtomicUsize,
    /// Scripted analysis result; absent -> empty analysis
    pub analyze_response: Mutex<Option<Value>>,
    pub delete_count: AtomicUsize,
}

/// Handle to a running mock backend
pub struct TestBackend {
    pub base_url: Url,
    pub state: Arc<BackendState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestBackend {
    /// Bind to an ephemeral port and start serving
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        *state.upload_error.lock() = "upload rejected".to_string();

        let app = Router::new()
            .route("/api/companies", get(list_companies))
            .route("/api/companies/refresh-all", post(refresh_all))
            .route("/api/companies/:ticker", get(get_company))
            .route("/api/companies/:ticker/refresh", post(refresh_company))
            .route(
                "/api/companies/:ticker/documents",
                post(upload_document).get(list_documents),
            )
            .route("/api/companies/:ticker/reports", get(list_reports))
            .route("/api/jobs/:job_id", get(get_job))
            .route("/api/batches", post(create_batch))
            .route("/api/batches/:batch_id", delete(delete_batch))
            .route("/api/batches/:batch_id/analyze", post(analyze_batch))
            .route("/api/batches/:batch_id/report", post(generate_report))
            .route(
                "/api/batches/:batch_id/report/detailed",
                post(generate_detailed_report),
            )
            .with_state(state.clone())
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("mock backend serve");
        });

        let base_url = Url::parse(&format!("http://{}", addr)).expect("base url");

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Application state wired to this backend with test-speed timings
    pub fn app_state(&self) -> AppState {
        let mut config = AppConfig::for_backend(self.base_url.clone());
        config.poll_initial_delay = Duration::from_millis(10);
        config.poll_interval = Duration::from_millis(10);
        config.request_timeout = Duration::from_secs(5);
        config.analyze_timeout = Duration::from_secs(5);

        AppState::new(config).expect("app state")
    }

    /// Script the sequence of job-status responses
    pub fn script_job(&self, statuses: Vec<Value>) {
        *self.state.job_script.lock() = statuses.into();
    }

    /// Make uploads of the given file names fail with `message`
    pub fn fail_uploads(&self, file_names: &[&str], message: &str) {
        *self.state.fail_upload_files.lock() =
            file_names.iter().map(|s| s.to_string()).collect();
        *self.state.upload_error.lock() = message.to_string();
    }

    pub fn set_companies(&self, companies: Vec<Value>) {
        *self.state.companies.lock() = companies;
    }

    pub fn set_analyze_response(&self, response: Value) {
        *self.state.analyze_response.lock() = Some(response);
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A company record in the backend's wire shape
pub fn company_json(ticker: &str, name: &str) -> Value {
    json!({
        "ticker": ticker,
        "name": name,
        "kb_status": "active",
        "report_count": 2,
        "chunk_count": 1480,
        "last_refreshed": "2025-03-01T08:30:00Z",
    })
}

/// A document record in the backend's wire shape
pub fn document_json(upload_id: &str, file_name: &str) -> Value {
    json!({
        "upload_id": upload_id,
        "file_name": file_name,
        "document_type": "filing",
        "status": "uploaded",
        "analyzed_at": null,
        "approved_at": null,
    })
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data, "error": null }))
}

fn rejected(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "data": null, "error": message }))
}

async fn list_companies(State(state): State<Arc<BackendState>>) -> Json<Value> {
    state.company_list_count.fetch_add(1, Ordering::SeqCst);
    ok(Value::Array(state.companies.lock().clone()))
}

async fn get_company(
    State(state): State<Arc<BackendState>>,
    Path(ticker): Path<String>,
) -> impl IntoResponse {
    if let Some((status, body)) = state.company_response.lock().clone() {
        return (StatusCode::from_u16(status).unwrap(), Json(body));
    }

    match state
        .companies
        .lock()
        .iter()
        .find(|c| c["ticker"] == ticker.as_str())
    {
        Some(company) => (StatusCode::OK, ok(company.clone())),
        None => (
            StatusCode::NOT_FOUND,
            rejected(&format!("No company {}", ticker)),
        ),
    }
}

async fn list_documents(State(_state): State<Arc<BackendState>>) -> Json<Value> {
    ok(json!([]))
}

async fn list_reports(State(_state): State<Arc<BackendState>>) -> Json<Value> {
    ok(json!([]))
}

async fn generate_report(
    State(_state): State<Arc<BackendState>>,
    Path(batch_id): Path<String>,
) -> Json<Value> {
    ok(json!({
        "report_id": format!("report-{}", batch_id),
        "batch_id": batch_id,
        "title": "Quarterly research summary",
        "content": "## Findings\n...",
        "generated_at": "2025-03-14T10:00:00Z",
    }))
}

async fn generate_detailed_report(
    State(_state): State<Arc<BackendState>>,
    Path(batch_id): Path<String>,
) -> Json<Value> {
    ok(json!({
        "report_id": format!("detailed-{}", batch_id),
        "batch_id": batch_id,
        "title": "Detailed research report",
        "content": "## Full analysis\n...",
        "generated_at": "2025-03-14T10:05:00Z",
    }))
}

async fn refresh_company(State(_state): State<Arc<BackendState>>) -> Json<Value> {
    ok(json!({ "job_id": "job-1" }))
}

async fn refresh_all(State(_state): State<Arc<BackendState>>) -> Json<Value> {
    ok(json!({ "job_id": "job-all-1" }))
}

async fn get_job(
    State(state): State<Arc<BackendState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    state.poll_count.fetch_add(1, Ordering::SeqCst);

    match state.job_script.lock().pop_front() {
        Some(mut status) => {
            status["job_id"] = json!(job_id);
            (StatusCode::OK, ok(status))
        }
        // Polling past the scripted terminal state is a test failure; make
        // it loud instead of hanging.
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            rejected("job script exhausted"),
        ),
    }
}

async fn upload_document(
    State(state): State<Arc<BackendState>>,
    Path(_ticker): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let in_flight = state.uploads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state
        .max_uploads_in_flight
        .fetch_max(in_flight, Ordering::SeqCst);
    state.upload_count.fetch_add(1, Ordering::SeqCst);

    // Hold the request open long enough for an overlapping upload to be
    // observed by the in-flight gauge.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut file_name = String::new();
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            file_name = field.file_name().unwrap_or("unnamed").to_string();
        }
        let _ = field.bytes().await;
    }

    state.uploaded_files.lock().push(file_name.clone());
    state.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);

    if state.fail_upload_files.lock().contains(&file_name) {
        let message = state.upload_error.lock().clone();
        return rejected(&message);
    }

    let count = state.upload_count.load(Ordering::SeqCst);
    ok(document_json(&format!("up-{}", count), &file_name))
}

async fn create_batch(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.batch_count.fetch_add(1, Ordering::SeqCst);
    let upload_ids = body["upload_ids"].clone();
    let name = body["name"].clone();
    let description = body["description"].clone();
    *state.last_batch_request.lock() = Some(body);

    ok(json!({
        "batch_id": format!("batch-{}", state.batch_count.load(Ordering::SeqCst)),
        "name": name,
        "description": description,
        "upload_ids": upload_ids,
        "status": "created",
    }))
}

async fn analyze_batch(
    State(state): State<Arc<BackendState>>,
    Path(batch_id): Path<String>,
) -> Json<Value> {
    state.analyze_count.fetch_add(1, Ordering::SeqCst);

    let mut response = state
        .analyze_response
        .lock()
        .clone()
        .unwrap_or_else(|| json!({ "analyzed": [], "failed": [] }));
    response["batch_id"] = json!(batch_id);

    ok(response)
}

async fn delete_batch(
    State(state): State<Arc<BackendState>>,
    Path(_batch_id): Path<String>,
) -> Json<Value> {
    state.delete_count.fetch_add(1, Ordering::SeqCst);
    ok(json!(null))
}
