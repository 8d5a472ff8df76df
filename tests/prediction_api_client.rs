//! PredictionApiClient against local stand-in services.

mod common;

use axum::Router;
use common::{client, client_at, dead_url, failing_service, feature_service, image_service, spawn, Hits};
use predict_client::{ImageBlob, PredictRequest, PredictionTransport, RequestFailure};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

fn features() -> BTreeMap<String, String> {
    [
        ("mean radius".to_string(), " 14.20 ".to_string()),
        ("worst area".to_string(), "880".to_string()),
    ]
    .into()
}

#[tokio::test]
async fn test_features_are_posted_as_raw_strings() {
    let base = spawn(feature_service(Hits::default())).await;

    let body = client(&base)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap();

    assert_eq!(body["prediction"], "Malignant");
    assert_eq!(body["benign_probability"], 0.12);
    assert_eq!(
        body["echo"],
        json!({ "features": { "mean radius": " 14.20 ", "worst area": "880" } })
    );
}

#[tokio::test]
async fn test_image_is_sent_as_single_file_field() {
    let base = spawn(image_service(Hits::default())).await;
    let blob = ImageBlob::new("letter.png", "image/png", vec![0x89, b'P', b'N', b'G']);

    let body = client(&base)
        .submit(&PredictRequest::Image(blob))
        .await
        .unwrap();

    assert_eq!(body["character"], "Q");
    assert_eq!(
        body["fields"],
        json!([{ "name": "file", "file_name": "letter.png", "content_type": "image/png", "len": 4 }])
    );
}

#[tokio::test]
async fn test_service_under_path_prefix_is_reached() {
    let hits = Hits::default();
    let base = spawn(Router::new().nest("/api", image_service(hits.clone()))).await;
    let blob = ImageBlob::new("letter.png", "image/png", vec![1, 2, 3]);

    let body = client(&format!("{}/api", base))
        .submit(&PredictRequest::Image(blob))
        .await
        .unwrap();

    assert_eq!(body["character"], "Q");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_detail_is_surfaced_verbatim() {
    let base = spawn(failing_service()).await;

    let failure = client_at(&base, "/detail", 30_000)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert!(matches!(failure, RequestFailure::Status { status: 503, .. }));
    assert_eq!(failure.user_message(), "model unavailable");
}

#[tokio::test]
async fn test_validation_detail_list_is_joined() {
    let base = spawn(failing_service()).await;

    let failure = client_at(&base, "/unprocessable", 30_000)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert_eq!(failure.user_message(), "value is not a valid float");
}

#[tokio::test]
async fn test_plain_error_falls_back_to_status_description() {
    let base = spawn(failing_service()).await;

    let failure = client_at(&base, "/plain", 30_000)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert_eq!(
        failure,
        RequestFailure::Status {
            status: 500,
            body: None
        }
    );
    assert_eq!(failure.user_message(), "Request failed with status code 500");
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let base = spawn(failing_service()).await;

    let failure = client_at(&base, "/slow", 100)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert_eq!(failure, RequestFailure::Timeout { elapsed_ms: 100 });
    assert_eq!(failure.user_message(), "Request timed out after 100ms");
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_failure() {
    let base = dead_url().await;

    let failure = client(&base)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert!(matches!(failure, RequestFailure::Network(_)));
    assert!(!failure.user_message().is_empty());
}

#[tokio::test]
async fn test_non_json_success_body_is_a_decode_failure() {
    let base = spawn(failing_service()).await;

    let failure = client_at(&base, "/garbage", 30_000)
        .submit(&PredictRequest::Features(features()))
        .await
        .unwrap_err();

    assert!(matches!(failure, RequestFailure::Decode(_)));
}

#[tokio::test]
async fn test_health_returns_service_message() {
    let base = spawn(feature_service(Hits::default())).await;

    let message = client(&base).health().await.unwrap();

    assert_eq!(message, "Breast Cancer Prediction API is running");
}
