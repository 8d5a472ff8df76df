use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::domain::{LabelPolicy, ProbabilityPolicy, DEFAULT_LABEL_KEYS};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Breast cancer feature service
    pub features: ServiceConfig,
    /// Handwritten character image service
    pub image: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service root, e.g. "http://127.0.0.1:8000"
    pub base_url: String,
    #[serde(default = "default_predict_path")]
    pub predict_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            predict_path: default_predict_path(),
            health_path: default_health_path(),
        }
    }
}

fn default_predict_path() -> String {
    "/predict".to_string()
}

fn default_health_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Per-request timeout in milliseconds (0 = wait forever)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("predict-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RenderConfig {
    #[serde(default)]
    pub probability_policy: ProbabilityPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Accept filter in file-picker syntax ("image/*", "image/png")
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Largest accepted file in bytes (0 = unlimited)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Label keys checked in order
    #[serde(default = "default_label_keys")]
    pub label_keys: Vec<String>,
}

fn default_accept() -> String {
    "image/*".to_string()
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_label_keys() -> Vec<String> {
    DEFAULT_LABEL_KEYS.iter().map(|k| k.to_string()).collect()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accept: default_accept(),
            max_bytes: default_max_bytes(),
            label_keys: default_label_keys(),
        }
    }
}

impl UploadConfig {
    pub fn label_policy(&self) -> LabelPolicy {
        LabelPolicy::new(self.label_keys.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("services.features.base_url", "http://127.0.0.1:8000")?
            .set_default("services.image.base_url", "http://127.0.0.1:8001")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PREDICT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PREDICT__SERVICES__FEATURES__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("PREDICT")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Built-in configuration for running without any config files
    pub fn default_config() -> Self {
        Self {
            services: ServicesConfig {
                features: ServiceConfig::new("http://127.0.0.1:8000"),
                image: ServiceConfig::new("http://127.0.0.1:8001"),
            },
            request: RequestConfig::default(),
            render: RenderConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, service) in [
            ("features", &self.services.features),
            ("image", &self.services.image),
        ] {
            match Url::parse(&service.base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(format!(
                    "services.{name}.base_url must be http(s), got scheme '{}'",
                    url.scheme()
                )),
                Err(e) => errors.push(format!("services.{name}.base_url is invalid: {e}")),
            }

            if !service.predict_path.starts_with('/') {
                errors.push(format!("services.{name}.predict_path must start with '/'"));
            }
        }

        if self.upload.label_keys.is_empty() {
            errors.push("upload.label_keys must name at least one key".to_string());
        }

        if self.upload.label_keys.iter().any(|k| k.trim().is_empty()) {
            errors.push("upload.label_keys must not contain blank keys".to_string());
        }

        if self.upload.accept.trim().is_empty() {
            errors.push("upload.accept must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
