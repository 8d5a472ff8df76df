use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission state shared by both workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Nothing in flight; inputs may be edited freely
    #[default]
    Idle,
    /// One request is in flight
    Submitting,
    /// Last request returned a usable prediction
    Succeeded,
    /// Last request failed or returned an unusable body
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "IDLE",
            SubmissionStatus::Submitting => "SUBMITTING",
            SubmissionStatus::Succeeded => "SUCCEEDED",
            SubmissionStatus::Failed => "FAILED",
        }
    }

    /// Check if this status can transition to another status
    pub fn can_transition_to(&self, target: SubmissionStatus) -> bool {
        use SubmissionStatus::*;

        match (self, target) {
            // Blocked submit attempt stays idle
            (Idle, Idle) => true,
            (Idle, Submitting) => true,

            (Submitting, Succeeded) => true,
            (Submitting, Failed) => true,
            (Submitting, Idle) => true, // Reset or invalidated

            // Resubmit, edit or reset after an outcome
            (Succeeded, Submitting) => true,
            (Succeeded, Idle) => true,
            (Failed, Submitting) => true,
            (Failed, Idle) => true,

            _ => false,
        }
    }

    /// Get valid next statuses from the current one
    pub fn valid_transitions(&self) -> Vec<SubmissionStatus> {
        use SubmissionStatus::*;

        match self {
            Idle => vec![Idle, Submitting],
            Submitting => vec![Succeeded, Failed, Idle],
            Succeeded => vec![Submitting, Idle],
            Failed => vec![Submitting, Idle],
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }

    /// Has the last submission produced an outcome the user is looking at?
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded | SubmissionStatus::Failed)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SubmissionStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "IDLE" => Ok(SubmissionStatus::Idle),
            "SUBMITTING" => Ok(SubmissionStatus::Submitting),
            "SUCCEEDED" => Ok(SubmissionStatus::Succeeded),
            "FAILED" => Ok(SubmissionStatus::Failed),
            _ => Err(format!("Unknown submission status: {}", s)),
        }
    }
}
