//! Readers for loosely specified service responses.
//!
//! Both backends are thin FastAPI apps whose bodies are not versioned, so
//! everything here works on a generic `serde_json::Value` and never fails
//! hard: absent or unusable fields come back as `None`.

use serde_json::Value;
use tracing::warn;

use super::prediction::{PredictionResult, ProbabilityPolicy};

/// Shown when an image response has none of the label keys.
pub const NO_PREDICTION_MESSAGE: &str = "No prediction returned from server";

/// Shown when a feature response lacks the label or probability.
pub const INCOMPLETE_PREDICTION_MESSAGE: &str = "Server returned an incomplete prediction";

/// Label keys the image service has used, highest priority first.
pub const DEFAULT_LABEL_KEYS: [&str; 4] = ["predicted_character", "prediction", "character", "result"];

/// Ordered list of candidate keys for the predicted label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPolicy {
    keys: Vec<String>,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_KEYS)
    }
}

impl LabelPolicy {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// First present candidate wins.
    pub fn extract(&self, body: &Value) -> Option<String> {
        self.keys.iter().find_map(|key| label_at(body, key))
    }
}

/// A usable label: non-empty string or a number. Null, empty strings and
/// other shapes count as absent.
fn label_at(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human-readable message under `detail`.
///
/// FastAPI sends either a plain string or, for request validation
/// failures, a list of `{loc, msg, type}` objects.
pub fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Why a successful feature response could not be used
#[derive(Debug, Clone, PartialEq)]
pub enum ResultIssue {
    Incomplete,
    InvalidProbability(f64),
}

impl ResultIssue {
    pub fn user_message(&self) -> String {
        match self {
            ResultIssue::Incomplete => INCOMPLETE_PREDICTION_MESSAGE.to_string(),
            ResultIssue::InvalidProbability(p) => {
                format!("Server returned an invalid probability: {}", p)
            }
        }
    }
}

/// Parse `{ prediction, benign_probability }` and apply the probability policy.
pub fn parse_prediction_result(
    body: &Value,
    policy: ProbabilityPolicy,
) -> Result<PredictionResult, ResultIssue> {
    let prediction = body
        .get("prediction")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(ResultIssue::Incomplete)?;
    let probability = body
        .get("benign_probability")
        .and_then(parse_probability)
        .ok_or(ResultIssue::Incomplete)?;

    if !probability.is_finite() {
        return Err(ResultIssue::InvalidProbability(probability));
    }

    let benign_probability = if (0.0..=1.0).contains(&probability) {
        probability
    } else {
        match policy {
            ProbabilityPolicy::Clamp => {
                warn!(
                    probability,
                    "benign probability outside [0, 1], clamping"
                );
                probability.clamp(0.0, 1.0)
            }
            ProbabilityPolicy::Reject => {
                return Err(ResultIssue::InvalidProbability(probability));
            }
        }
    };

    Ok(PredictionResult {
        prediction: prediction.to_string(),
        benign_probability,
    })
}

fn parse_probability(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
