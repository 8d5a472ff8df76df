//! HTTP transport for the prediction services.
//!
//! One `submit` is exactly one POST. Nothing is retried here: a failure is
//! handed back to the workflow, which shows it and lets the user decide.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{RequestConfig, ServiceConfig};
use crate::domain::ImageBlob;
use crate::error::{PredictError, RequestFailure, Result};

/// Multipart field the image service reads the upload from.
pub const IMAGE_FIELD: &str = "file";

/// Outbound payload, one variant per workflow
#[derive(Debug, Clone, PartialEq)]
pub enum PredictRequest {
    /// Sent as `{ "features": { name: raw string } }`
    Features(BTreeMap<String, String>),
    /// Sent as multipart with a single `file` field
    Image(ImageBlob),
}

impl PredictRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Features(_) => "features",
            Self::Image(_) => "image",
        }
    }
}

#[derive(Serialize)]
struct FeaturesBody<'a> {
    features: &'a BTreeMap<String, String>,
}

/// Anything that can carry a prediction request to a service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn submit(&self, request: &PredictRequest) -> std::result::Result<Value, RequestFailure>;
}

/// reqwest-backed client for one prediction service
#[derive(Clone)]
pub struct PredictionApiClient {
    http: Client,
    predict_url: Url,
    health_url: Url,
    timeout: Option<Duration>,
}

impl PredictionApiClient {
    pub fn new(service: &ServiceConfig, request: &RequestConfig) -> Result<Self> {
        let base = Url::parse(&service.base_url)?;
        let predict_url = service_url(&base, &service.predict_path)?;
        let health_url = service_url(&base, &service.health_path)?;

        let mut builder = Client::builder().user_agent(request.user_agent.clone());
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            PredictError::Other(anyhow::anyhow!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            http,
            predict_url,
            health_url,
            timeout: request.timeout(),
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    /// `GET /`; returns the service's `message` field.
    pub async fn health(&self) -> std::result::Result<String, RequestFailure> {
        let started = Instant::now();
        let body = self
            .send(self.http.get(self.health_url.clone()), started)
            .await?;

        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()))
    }

    fn build(&self, request: &PredictRequest) -> std::result::Result<RequestBuilder, RequestFailure> {
        let req = self.http.post(self.predict_url.clone());

        match request {
            PredictRequest::Features(features) => Ok(req.json(&FeaturesBody { features })),
            PredictRequest::Image(blob) => {
                let part = Part::bytes(blob.bytes().to_vec())
                    .file_name(blob.file_name.clone())
                    .mime_str(&blob.content_type)
                    .map_err(|e| RequestFailure::Network(format!("invalid content type: {}", e)))?;
                Ok(req.multipart(Form::new().part(IMAGE_FIELD, part)))
            }
        }
    }

    async fn send(
        &self,
        req: RequestBuilder,
        started: Instant,
    ) -> std::result::Result<Value, RequestFailure> {
        let resp = req.send().await.map_err(|e| self.classify(e, started))?;
        read_body(resp).await.map_err(|e| match e {
            ReadError::Transport(e) => self.classify(e, started),
            ReadError::Failure(f) => f,
        })
    }

    fn classify(&self, err: reqwest::Error, started: Instant) -> RequestFailure {
        if err.is_timeout() {
            let elapsed_ms = self
                .timeout
                .unwrap_or_else(|| started.elapsed())
                .as_millis() as u64;
            RequestFailure::Timeout { elapsed_ms }
        } else {
            RequestFailure::Network(err.to_string())
        }
    }
}

/// Append `path` below the base URL's own path, so a service mounted at
/// `http://host/api` is posted at `http://host/api/predict`.
fn service_url(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            PredictError::Validation(format!("{} cannot be used as a base URL", base))
        })?;
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        if path.ends_with('/') {
            segments.push("");
        }
    }
    Ok(url)
}

enum ReadError {
    Transport(reqwest::Error),
    Failure(RequestFailure),
}

async fn read_body(resp: Response) -> std::result::Result<Value, ReadError> {
    let status = resp.status();
    let text = resp.text().await.map_err(ReadError::Transport)?;

    if !status.is_success() {
        let body = serde_json::from_str::<Value>(&text).ok();
        return Err(ReadError::Failure(RequestFailure::Status {
            status: status.as_u16(),
            body,
        }));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| ReadError::Failure(RequestFailure::Decode(e.to_string())))
}

#[async_trait]
impl PredictionTransport for PredictionApiClient {
    async fn submit(&self, request: &PredictRequest) -> std::result::Result<Value, RequestFailure> {
        let started = Instant::now();
        info!(kind = request.kind(), url = %self.predict_url, "submitting prediction request");

        let result = match self.build(request) {
            Ok(req) => self.send(req, started).await,
            Err(failure) => Err(failure),
        };

        match &result {
            Ok(_) => debug!(
                kind = request.kind(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "prediction request succeeded"
            ),
            Err(failure) => warn!(kind = request.kind(), "prediction request failed: {}", failure),
        }

        result
    }
}
