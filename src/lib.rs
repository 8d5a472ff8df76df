pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod validation;
pub mod workflow;

pub use adapters::{PredictRequest, PredictionApiClient, PredictionTransport};
pub use config::AppConfig;
pub use domain::{
    FeatureSpec, ImageBlob, LabelPolicy, PredictionResult, ProbabilityPolicy, SubmissionStatus,
    FEATURE_SPECS,
};
pub use error::{PredictError, RequestFailure, Result};
pub use render::{render, Classification, ColorScheme, Presentation};
pub use validation::{validate, FieldError};
pub use workflow::{
    DragEvent, FeatureFormWorkflow, FormState, ImageUploadWorkflow, InMemoryPreviewStore,
    PreviewStore, SubmitAttempt, SubmitTicket, UploadPhase, UploadState,
};
