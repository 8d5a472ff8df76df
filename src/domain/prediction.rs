use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{PredictError, Result};

/// Feature workflow result as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Label containing "malignant" or "benign" in some casing
    pub prediction: String,
    pub benign_probability: f64,
}

impl PredictionResult {
    /// Always derived, never stored.
    pub fn malignant_probability(&self) -> f64 {
        1.0 - self.benign_probability
    }

    pub fn is_malignant(&self) -> bool {
        self.prediction.to_lowercase().contains("malignant")
    }
}

/// What to do with a benign probability outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityPolicy {
    /// Clamp into range and log a warning
    #[default]
    Clamp,
    /// Treat the response as a failure
    Reject,
}

impl ProbabilityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for ProbabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a selected image. Cloning shares the bytes.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlob {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    #[serde(skip)]
    bytes: Arc<Vec<u8>>,
}

impl ImageBlob {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes: Arc::new(bytes),
        }
    }

    /// Read a file from disk, guessing the content type from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PredictError::Validation(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let content_type = guess_content_type(path);

        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
