use serde_json::Value;
use thiserror::Error;

use crate::domain::response::detail_message;

/// Fallback shown when a failed request carries nothing more useful.
pub const GENERIC_FAILURE_MESSAGE: &str = "Prediction failed. Please try again.";

/// Main error type for the prediction client
#[derive(Error, Debug)]
pub enum PredictError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Network errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed: {0}")]
    Request(#[from] RequestFailure),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // Input errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown feature: {0}")]
    UnknownField(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for PredictError
pub type Result<T> = std::result::Result<T, PredictError>;

/// How a single call to the prediction service failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestFailure {
    /// The service answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Option<Value> },

    #[error("Request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The service could not be reached at all.
    #[error("{0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl RequestFailure {
    /// Server-provided `detail` message, if the failure body had one.
    pub fn detail(&self) -> Option<String> {
        match self {
            RequestFailure::Status { body: Some(body), .. } => detail_message(body),
            _ => None,
        }
    }

    /// Single user-facing line: server detail, then the raw description,
    /// then the generic fallback.
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail;
        }

        let description = self.to_string();
        if description.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            description
        }
    }
}
