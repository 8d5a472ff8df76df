//! Stand-in prediction services for integration tests.
#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use predict_client::config::{RequestConfig, ServiceConfig};
use predict_client::PredictionApiClient;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub type Hits = Arc<AtomicUsize>;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str) -> PredictionApiClient {
    client_at(base_url, "/predict", 30_000)
}

/// Client posting to `predict_path` with a `timeout_ms` budget (0 = none).
pub fn client_at(base_url: &str, predict_path: &str, timeout_ms: u64) -> PredictionApiClient {
    let mut service = ServiceConfig::new(base_url);
    service.predict_path = predict_path.to_string();
    let request = RequestConfig {
        timeout_ms,
        ..RequestConfig::default()
    };
    PredictionApiClient::new(&service, &request).unwrap()
}

/// Feature service: malignant with 12% benign, echoing the request body.
pub fn feature_service(hits: Hits) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({ "message": "Breast Cancer Prediction API is running" })) }))
        .route("/predict", post(predict_features))
        .with_state(hits)
}

async fn predict_features(State(hits): State<Hits>, Json(body): Json<Value>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "prediction": "Malignant",
        "raw_class": 0,
        "benign_probability": 0.12,
        "echo": body,
    }))
}

/// Image service answering with the `character` key, like the real backend.
pub fn image_service(hits: Hits) -> Router {
    Router::new()
        .route("/predict", post(predict_image))
        .with_state(hits)
}

async fn predict_image(State(hits): State<Hits>, mut multipart: Multipart) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let len = field.bytes().await.unwrap().len();
        fields.push(json!({
            "name": name,
            "file_name": file_name,
            "content_type": content_type,
            "len": len,
        }));
    }
    Json(json!({
        "encoded_class": 26,
        "emnist_label": 27,
        "character": "Q",
        "fields": fields,
    }))
}

/// Routes that fail in the ways the real services do.
pub fn failing_service() -> Router {
    Router::new()
        .route(
            "/detail",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "model unavailable" })),
                )
            }),
        )
        .route(
            "/plain",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        )
        .route(
            "/unprocessable",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "detail": [
                            { "loc": ["body", "features", "mean radius"], "msg": "value is not a valid float", "type": "type_error.float" }
                        ]
                    })),
                )
            }),
        )
        .route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({ "character": "late" }))
            }),
        )
        .route("/empty", post(|| async { Json(json!({ "encoded_class": 1 })) }))
        .route("/garbage", post(|| async { "not json" }))
}

/// Base URL of a port nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
