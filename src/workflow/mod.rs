//! Submission workflows.
//!
//! Each workflow owns an explicit, serializable state record and moves it
//! through `SubmissionStatus` in response to discrete events. The network
//! call is the only suspending step; it is bracketed by `begin_submit` and
//! `complete`, and a generation counter makes sure an answer that arrives
//! after a reset or a newer submission is dropped instead of applied.

pub mod feature_form;
pub mod image_upload;
pub mod preview;

use std::collections::BTreeMap;

use crate::adapters::PredictRequest;

pub use feature_form::{FeatureFormWorkflow, FormState, CORRECT_FIELDS_MESSAGE};
pub use image_upload::{AcceptFilter, DragEvent, ImageUploadWorkflow, UploadPhase, UploadState};
pub use preview::{InMemoryPreviewStore, PreviewHandle, PreviewStore};

/// A request cleared to go out, tagged with the generation it belongs to
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub generation: u64,
    pub request: PredictRequest,
}

/// Result of asking a workflow to start a submission
#[derive(Debug)]
pub enum SubmitAttempt {
    Ready(SubmitTicket),
    /// Validation failed; no request was made
    Blocked(BTreeMap<String, String>),
    /// A request is already in flight
    InFlight,
    /// Nothing selected to upload
    NoFile,
}

impl SubmitAttempt {
    pub fn is_ready(&self) -> bool {
        matches!(self, SubmitAttempt::Ready(_))
    }
}
