//! Fake styling backend for integration tests

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use closethaus::app::AppState;
use closethaus::remote::HttpStylistApi;
use closethaus::services::AppSettings;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 1x1 transparent PNG
pub const PNG_1X1: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn png_data_url() -> String {
    format!("data:image/png;base64,{}", PNG_1X1)
}

/// Canned replies served by the fake backend
pub struct Backend {
    pub classify: Mutex<(StatusCode, Value)>,
    pub generate: Mutex<(StatusCode, Value)>,
    pub classify_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub last_generate: Mutex<Option<Value>>,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            classify: Mutex::new((
                StatusCode::OK,
                json!({ "name": "Denim Jacket", "category": "Top" }),
            )),
            generate: Mutex::new((StatusCode::OK, json!({ "base64Image": PNG_1X1 }))),
            classify_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            last_generate: Mutex::new(None),
        })
    }

    pub fn set_classify(&self, status: StatusCode, body: Value) {
        *self.classify.lock().unwrap() = (status, body);
    }

    pub fn set_generate(&self, status: StatusCode, body: Value) {
        *self.generate.lock().unwrap() = (status, body);
    }
}

async fn classify(State(backend): State<Arc<Backend>>, Json(_body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.classify_calls.fetch_add(1, Ordering::SeqCst);
    let (status, body) = backend.classify.lock().unwrap().clone();
    (status, Json(body))
}

async fn generate(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.generate_calls.fetch_add(1, Ordering::SeqCst);
    *backend.last_generate.lock().unwrap() = Some(body);
    let (status, body) = backend.generate.lock().unwrap().clone();
    (status, Json(body))
}

/// Serve the backend on an ephemeral port and return its base URL
pub async fn spawn_backend(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/api/classify", post(classify))
        .route("/api/generate", post(generate))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A base URL nothing is listening on
pub async fn dead_backend_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Build and hydrate an app rooted at `dir`, talking to `base_url`
pub async fn open_app(dir: &Path, base_url: &str) -> AppState {
    let api = HttpStylistApi::new(base_url, Duration::from_secs(10)).unwrap();
    let state = AppState::new(dir.to_path_buf(), AppSettings::default(), Arc::new(api));
    state.coordinator.initialize().await;
    state
}
