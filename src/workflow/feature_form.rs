use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::{SubmitAttempt, SubmitTicket};
use crate::adapters::{PredictRequest, PredictionTransport};
use crate::domain::response::parse_prediction_result;
use crate::domain::{
    find_spec, FeatureSpec, PredictionResult, ProbabilityPolicy, SubmissionStatus, FEATURE_SPECS,
};
use crate::error::{PredictError, RequestFailure, Result};
use crate::render::{render, Presentation};
use crate::validation::validate;

/// Top-level message shown when a submit attempt is blocked by validation.
pub const CORRECT_FIELDS_MESSAGE: &str = "Please correct the highlighted fields before submitting.";

/// Per-session state of the feature form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Raw text per feature name, exactly as typed
    pub inputs: BTreeMap<String, String>,
    /// Absent key means the field is currently valid
    pub validation_errors: BTreeMap<String, String>,
    pub submission_status: SubmissionStatus,
    pub last_result: Option<PredictionResult>,
    pub last_error: Option<String>,
}

/// Ten-field diagnostic form and its submit/result cycle
pub struct FeatureFormWorkflow {
    specs: Vec<FeatureSpec>,
    policy: ProbabilityPolicy,
    state: FormState,
    generation: u64,
}

impl Default for FeatureFormWorkflow {
    fn default() -> Self {
        Self::new(&FEATURE_SPECS)
    }
}

impl FeatureFormWorkflow {
    pub fn new(specs: &[FeatureSpec]) -> Self {
        Self {
            specs: specs.to_vec(),
            policy: ProbabilityPolicy::default(),
            state: FormState::default(),
            generation: 0,
        }
    }

    pub fn with_probability_policy(mut self, policy: ProbabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Submit control is disabled while a request is in flight.
    pub fn can_submit(&self) -> bool {
        !self.state.submission_status.is_in_flight()
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.state.validation_errors.get(name).map(String::as_str)
    }

    pub fn presentation(&self) -> Option<Presentation> {
        self.state.last_result.as_ref().map(render)
    }

    /// Record a keystroke-level change to one field.
    ///
    /// Clears only that field's validation error. A shown result or error
    /// is stale once inputs change, so the form drops back to `Idle`; an
    /// in-flight request is invalidated the same way.
    pub fn edit(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if find_spec(&self.specs, name).is_none() {
            return Err(PredictError::UnknownField(name.to_string()));
        }

        self.state.inputs.insert(name.to_string(), value.into());
        self.state.validation_errors.remove(name);
        self.state.last_error = None;

        let status = self.state.submission_status;
        if status.is_in_flight() || status.is_terminal() {
            if status.is_in_flight() {
                self.generation += 1;
            }
            self.state.last_result = None;
            self.transition(SubmissionStatus::Idle, "input edited");
        }

        Ok(())
    }

    /// Run full validation and, if it passes, move to `Submitting`.
    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if self.state.submission_status.is_in_flight() {
            debug!("feature submission already in flight");
            return SubmitAttempt::InFlight;
        }

        let errors = validate(&self.state.inputs, &self.specs);
        self.state.validation_errors = errors.clone();

        if !errors.is_empty() {
            info!(invalid_fields = errors.len(), "feature submission blocked by validation");
            self.state.last_result = None;
            self.state.last_error = Some(CORRECT_FIELDS_MESSAGE.to_string());
            self.transition(SubmissionStatus::Idle, "validation failed");
            return SubmitAttempt::Blocked(errors);
        }

        self.generation += 1;
        self.state.last_result = None;
        self.state.last_error = None;
        self.transition(SubmissionStatus::Submitting, "validation passed");

        SubmitAttempt::Ready(SubmitTicket {
            generation: self.generation,
            request: PredictRequest::Features(self.state.inputs.clone()),
        })
    }

    /// Apply the outcome of the request issued under `generation`.
    ///
    /// Returns `false` (and leaves state untouched) when the form has been
    /// reset, edited or resubmitted since.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: std::result::Result<Value, RequestFailure>,
    ) -> bool {
        if generation != self.generation || !self.state.submission_status.is_in_flight() {
            warn!(
                generation,
                current = self.generation,
                "ignoring stale feature prediction response"
            );
            return false;
        }

        match outcome.map_err(|f| f.user_message()).and_then(|body| {
            parse_prediction_result(&body, self.policy).map_err(|issue| issue.user_message())
        }) {
            Ok(result) => {
                info!(
                    prediction = %result.prediction,
                    benign_probability = result.benign_probability,
                    "feature prediction received"
                );
                self.state.last_result = Some(result);
                self.state.last_error = None;
                self.transition(SubmissionStatus::Succeeded, "response received");
            }
            Err(message) => {
                warn!(error = %message, "feature prediction failed");
                self.state.last_result = None;
                self.state.last_error = Some(message);
                self.transition(SubmissionStatus::Failed, "request failed");
            }
        }

        true
    }

    /// Validate, send through `transport` and apply the outcome.
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

    /// Back to an empty form. Always allowed.
    pub fn reset(&mut self) {
        self.generation += 1;
        debug!(from = %self.state.submission_status, "feature form reset");
        self.state = FormState::default();
    }

    fn transition(&mut self, to: SubmissionStatus, reason: &str) {
        let from = self.state.submission_status;
        if !from.can_transition_to(to) {
            warn!(%from, %to, reason, "unexpected feature form transition");
        }
        debug!(%from, %to, reason, "feature form transition");
        self.state.submission_status = to;
    }
}
