use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::preview::{PreviewHandle, PreviewStore};
use super::{SubmitAttempt, SubmitTicket};
use crate::adapters::{PredictRequest, PredictionTransport};
use crate::config::UploadConfig;
use crate::domain::response::NO_PREDICTION_MESSAGE;
use crate::domain::{ImageBlob, LabelPolicy, SubmissionStatus};
use crate::error::RequestFailure;

/// Per-session state of the upload form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadState {
    pub selected_file: Option<ImageBlob>,
    /// Present iff `selected_file` is
    pub preview_url: Option<String>,
    pub drag_active: bool,
    pub submission_status: SubmissionStatus,
    pub predicted_label: Option<String>,
    pub last_error: Option<String>,
}

/// Coarse view of where the upload form is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    Empty,
    FileSelected,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
}

/// File-picker style accept filter plus a size cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptFilter {
    patterns: Vec<String>,
    max_bytes: u64,
}

impl Default for AcceptFilter {
    fn default() -> Self {
        Self::new("image/*", 0)
    }
}

impl AcceptFilter {
    /// `accept` uses `<input accept>` syntax: comma separated MIME types,
    /// `type/*` wildcards or `.ext` suffixes.
    pub fn new(accept: &str, max_bytes: u64) -> Self {
        Self {
            patterns: accept
                .split(',')
                .map(|p| p.trim().to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            max_bytes,
        }
    }

    pub fn check(&self, blob: &ImageBlob) -> Result<(), String> {
        let content_type = blob.content_type.to_ascii_lowercase();
        let file_name = blob.file_name.to_ascii_lowercase();

        let accepted = self.patterns.is_empty()
            || self.patterns.iter().any(|pattern| {
                if let Some(ext) = pattern.strip_prefix('.') {
                    file_name.ends_with(&format!(".{}", ext))
                } else if let Some(major) = pattern.strip_suffix("/*") {
                    content_type.starts_with(&format!("{}/", major))
                } else {
                    content_type == *pattern
                }
            });

        if !accepted {
            return Err(format!("Unsupported file type: {}", blob.content_type));
        }

        if self.max_bytes > 0 && blob.size > self.max_bytes {
            return Err(format!(
                "File is too large: {} bytes (limit {} bytes)",
                blob.size, self.max_bytes
            ));
        }

        Ok(())
    }
}

/// Single-image upload form and its submit/result cycle
pub struct ImageUploadWorkflow {
    store: Arc<dyn PreviewStore>,
    preview: Option<PreviewHandle>,
    filter: AcceptFilter,
    labels: LabelPolicy,
    state: UploadState,
    generation: u64,
}

impl ImageUploadWorkflow {
    pub fn new(store: Arc<dyn PreviewStore>) -> Self {
        Self {
            store,
            preview: None,
            filter: AcceptFilter::default(),
            labels: LabelPolicy::default(),
            state: UploadState::default(),
            generation: 0,
        }
    }

    pub fn from_config(store: Arc<dyn PreviewStore>, upload: &UploadConfig) -> Self {
        Self::new(store)
            .with_accept_filter(AcceptFilter::new(&upload.accept, upload.max_bytes))
            .with_label_policy(upload.label_policy())
    }

    pub fn with_accept_filter(mut self, filter: AcceptFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_label_policy(mut self, labels: LabelPolicy) -> Self {
        self.labels = labels;
        self
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> UploadPhase {
        match self.state.submission_status {
            SubmissionStatus::Submitting => UploadPhase::Submitting,
            SubmissionStatus::Succeeded => UploadPhase::Succeeded,
            SubmissionStatus::Failed => UploadPhase::Failed,
            SubmissionStatus::Idle if self.state.selected_file.is_some() => {
                UploadPhase::FileSelected
            }
            SubmissionStatus::Idle => UploadPhase::Empty,
        }
    }

    /// Enabled only with a file selected and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.state.selected_file.is_some() && !self.state.submission_status.is_in_flight()
    }

    /// File-picker entry point. An empty pick is ignored.
    pub fn pick_file(&mut self, file: Option<ImageBlob>) -> bool {
        match file {
            Some(blob) => self.select_file(blob),
            None => false,
        }
    }

    pub fn handle_drag(&mut self, event: DragEvent) {
        self.state.drag_active = matches!(event, DragEvent::Enter | DragEvent::Over);
    }

    /// Drop entry point; only the first dropped file is used.
    pub fn drop_files(&mut self, files: Vec<ImageBlob>) -> bool {
        self.state.drag_active = false;
        match files.into_iter().next() {
            Some(blob) => self.select_file(blob),
            None => false,
        }
    }

    /// Common acquisition path for picker and drop.
    ///
    /// The previous preview is released before the new one is created. A
    /// file rejected by the accept filter leaves the current selection as
    /// it was and only records the error; if an upload was in flight it is
    /// abandoned so the error is not overwritten by its response.
    pub fn select_file(&mut self, blob: ImageBlob) -> bool {
        if let Err(message) = self.filter.check(&blob) {
            warn!(file = %blob.file_name, error = %message, "file rejected");
            if self.state.submission_status.is_in_flight() {
                self.generation += 1;
                self.transition(SubmissionStatus::Idle, "file rejected");
            }
            self.state.last_error = Some(message);
            return false;
        }

        if self.state.submission_status.is_in_flight() {
            self.generation += 1;
        }

        self.preview = None;
        let handle = PreviewHandle::acquire(self.store.clone(), &blob);

        info!(file = %blob.file_name, size = blob.size, "image selected");
        self.state.preview_url = Some(handle.url().to_string());
        self.preview = Some(handle);
        self.state.selected_file = Some(blob);
        self.state.predicted_label = None;
        self.state.last_error = None;
        self.transition(SubmissionStatus::Idle, "file selected");
        true
    }

    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if self.state.submission_status.is_in_flight() {
            debug!("image submission already in flight");
            return SubmitAttempt::InFlight;
        }

        let blob = match &self.state.selected_file {
            Some(blob) => blob.clone(),
            None => return SubmitAttempt::NoFile,
        };

        self.generation += 1;
        self.state.predicted_label = None;
        self.state.last_error = None;
        self.transition(SubmissionStatus::Submitting, "upload started");

        SubmitAttempt::Ready(SubmitTicket {
            generation: self.generation,
            request: PredictRequest::Image(blob),
        })
    }

    /// Apply the outcome of the request issued under `generation`.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: std::result::Result<Value, RequestFailure>,
    ) -> bool {
        if generation != self.generation || !self.state.submission_status.is_in_flight() {
            warn!(
                generation,
                current = self.generation,
                "ignoring stale image prediction response"
            );
            return false;
        }

        let result = match outcome {
            Ok(body) => self.labels.extract(&body).ok_or_else(|| {
                warn!(%body, "unexpected image response format");
                NO_PREDICTION_MESSAGE.to_string()
            }),
            Err(failure) => Err(failure.user_message()),
        };

        match result {
            Ok(label) => {
                info!(label = %label, "image prediction received");
                self.state.predicted_label = Some(label);
                self.state.last_error = None;
                self.transition(SubmissionStatus::Succeeded, "response received");
            }
            Err(message) => {
                warn!(error = %message, "image prediction failed");
                self.state.predicted_label = None;
                self.state.last_error = Some(message);
                self.transition(SubmissionStatus::Failed, "request failed");
            }
        }

        true
    }

    pub async fn submit<T>(&mut self, transport: &T) -> SubmissionStatus
    where
        T: PredictionTransport + ?Sized,
    {
        if let SubmitAttempt::Ready(ticket) = self.begin_submit() {
            let outcome = transport.submit(&ticket.request).await;
            self.complete(ticket.generation, outcome);
        }
        self.state.submission_status
    }

    /// Release the preview and return to an empty form.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.preview = None;
        debug!(from = %self.state.submission_status, "image upload reset");
        self.state = UploadState::default();
    }

    fn transition(&mut self, to: SubmissionStatus, reason: &str) {
        let from = self.state.submission_status;
        if !from.can_transition_to(to) {
            warn!(%from, %to, reason, "unexpected image upload transition");
        }
        debug!(%from, %to, reason, "image upload transition");
        self.state.submission_status = to;
    }
}
