//! Both workflows driven end to end through the real HTTP client.

mod common;

use common::{client, client_at, failing_service, feature_service, image_service, spawn, Hits};
use predict_client::workflow::CORRECT_FIELDS_MESSAGE;
use predict_client::{
    DragEvent, FeatureFormWorkflow, ImageBlob, ImageUploadWorkflow, PreviewStore,
    SubmissionStatus, UploadPhase, FEATURE_SPECS,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

fn filled_form() -> FeatureFormWorkflow {
    let mut form = FeatureFormWorkflow::default();
    for spec in FEATURE_SPECS.iter() {
        form.edit(spec.name, format!("{}", (spec.min + spec.max) / 2.0))
            .unwrap();
    }
    form
}

fn png(name: &str) -> ImageBlob {
    ImageBlob::new(name, "image/png", vec![1, 2, 3])
}

/// Preview store that logs every create/revoke in order.
#[derive(Default)]
struct RecordingStore {
    next: AtomicU64,
    events: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PreviewStore for RecordingStore {
    fn create(&self, _blob: &ImageBlob) -> String {
        let url = format!("blob:test/{}", self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.events.lock().unwrap().push(format!("create {}", url));
        url
    }

    fn revoke(&self, url: &str) {
        self.events.lock().unwrap().push(format!("revoke {}", url));
    }
}

#[tokio::test]
async fn test_feature_form_success_renders_bars() {
    let hits = Hits::default();
    let base = spawn(feature_service(hits.clone())).await;
    let mut form = filled_form();

    let status = form.submit(&client(&base)).await;

    assert_eq!(status, SubmissionStatus::Succeeded);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let presentation = form.presentation().unwrap();
    assert_eq!(presentation.label, "Malignant");
    assert!(presentation.is_malignant());
    assert_eq!(presentation.benign_width(), "12%");
    assert_eq!(presentation.malignant_width(), "88%");
    assert_eq!(presentation.scheme.background, "#FEE2E2");
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_service() {
    let hits = Hits::default();
    let base = spawn(feature_service(hits.clone())).await;
    let mut form = filled_form();
    form.edit("mean radius", "3").unwrap();
    form.edit("mean area", "lots").unwrap();

    let status = form.submit(&client(&base)).await;

    assert_eq!(status, SubmissionStatus::Idle);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(form.field_error("mean radius"), Some("Range: 6-28"));
    assert_eq!(form.field_error("mean area"), Some("Must be a number"));
    assert_eq!(form.state().last_error.as_deref(), Some(CORRECT_FIELDS_MESSAGE));
}

#[tokio::test]
async fn test_feature_form_server_error_is_shown() {
    let base = spawn(failing_service()).await;
    let mut form = filled_form();

    let status = form.submit(&client_at(&base, "/detail", 30_000)).await;

    assert_eq!(status, SubmissionStatus::Failed);
    assert_eq!(form.state().last_error.as_deref(), Some("model unavailable"));
    assert!(form.presentation().is_none());
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_feature_form_timeout_allows_retry() {
    let base = spawn(failing_service()).await;
    let mut form = filled_form();

    let status = form.submit(&client_at(&base, "/slow", 100)).await;
    assert_eq!(status, SubmissionStatus::Failed);
    assert_eq!(
        form.state().last_error.as_deref(),
        Some("Request timed out after 100ms")
    );

    let healthy = spawn(feature_service(Hits::default())).await;
    assert_eq!(form.submit(&client(&healthy)).await, SubmissionStatus::Succeeded);
    assert!(form.state().last_error.is_none());
}

#[tokio::test]
async fn test_image_upload_predicts_character() {
    let hits = Hits::default();
    let base = spawn(image_service(hits.clone())).await;
    let store = Arc::new(RecordingStore::default());
    let mut upload = ImageUploadWorkflow::new(store.clone());

    upload.handle_drag(DragEvent::Enter);
    assert!(upload.state().drag_active);
    assert!(upload.drop_files(vec![png("q.png"), png("ignored.png")]));
    assert!(!upload.state().drag_active);
    assert_eq!(upload.phase(), UploadPhase::FileSelected);

    let status = upload.submit(&client(&base)).await;

    assert_eq!(status, SubmissionStatus::Succeeded);
    assert_eq!(upload.state().predicted_label.as_deref(), Some("Q"));
    assert_eq!(upload.state().selected_file.as_ref().unwrap().file_name, "q.png");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_image_response_without_label_fails() {
    let base = spawn(failing_service()).await;
    let store = Arc::new(RecordingStore::default());
    let mut upload = ImageUploadWorkflow::new(store);
    upload.pick_file(Some(png("blank.png")));

    let status = upload.submit(&client_at(&base, "/empty", 30_000)).await;

    assert_eq!(status, SubmissionStatus::Failed);
    assert_eq!(
        upload.state().last_error.as_deref(),
        Some("No prediction returned from server")
    );
    assert_eq!(upload.phase(), UploadPhase::Failed);
}

#[tokio::test]
async fn test_previews_are_released_in_order() {
    let base = spawn(image_service(Hits::default())).await;
    let store = Arc::new(RecordingStore::default());
    let mut upload = ImageUploadWorkflow::new(store.clone());

    upload.pick_file(Some(png("a.png")));
    assert_eq!(upload.submit(&client(&base)).await, SubmissionStatus::Succeeded);

    upload.pick_file(Some(png("b.png")));
    assert_eq!(upload.phase(), UploadPhase::FileSelected);
    assert!(upload.state().predicted_label.is_none());
    assert_eq!(upload.state().preview_url.as_deref(), Some("blob:test/2"));

    upload.reset();

    assert_eq!(
        store.events(),
        vec![
            "create blob:test/1",
            "revoke blob:test/1",
            "create blob:test/2",
            "revoke blob:test/2",
        ]
    );
    assert_eq!(upload.phase(), UploadPhase::Empty);
}

#[tokio::test]
async fn test_rejected_file_keeps_current_selection() {
    let store = Arc::new(RecordingStore::default());
    let mut upload = ImageUploadWorkflow::new(store.clone());
    upload.pick_file(Some(png("a.png")));

    let accepted = upload.pick_file(Some(ImageBlob::new(
        "notes.txt",
        "text/plain",
        b"hello".to_vec(),
    )));

    assert!(!accepted);
    assert_eq!(upload.state().selected_file.as_ref().unwrap().file_name, "a.png");
    assert_eq!(
        upload.state().last_error.as_deref(),
        Some("Unsupported file type: text/plain")
    );
    assert_eq!(store.events(), vec!["create blob:test/1"]);
}
