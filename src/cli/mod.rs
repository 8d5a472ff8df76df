//! Predict CLI - terminal front end for both prediction workflows
//!
//! Commands:
//! - `predict specs` - List the diagnostic features and their ranges
//! - `predict features` - Fill and submit the feature form
//! - `predict image` - Upload one or more images for character recognition
//! - `predict ping` - Check that a service is up

pub mod interactive;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{PredictError, Result};

/// Prediction service client
#[derive(Parser, Debug)]
#[command(name = "predict")]
#[command(author, version, about = "Client for the feature and image prediction services")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <PREDICT_ENV>.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,

    /// Print the workflow state as JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the diagnostic features and their accepted ranges
    Specs,

    /// Submit the ten diagnostic measurements
    Features {
        /// Field assignment, e.g. --set "mean radius=14.2" (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// JSON or TOML file with feature values
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Prompt for missing or invalid fields
        #[arg(short = 'I', long)]
        interactive: bool,

        /// Override the feature service base URL
        #[arg(long, env = "PREDICT_FEATURES_URL")]
        url: Option<String>,
    },

    /// Upload images for character recognition, one after another
    Image {
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Override the image service base URL
        #[arg(long, env = "PREDICT_IMAGE_URL")]
        url: Option<String>,
    },

    /// Call a service's health endpoint
    Ping {
        #[arg(value_enum, default_value = "features")]
        target: Target,

        /// Override the service base URL
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Features,
    Image,
}

/// Split "name=value" at the first '='.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        PredictError::Validation(format!("expected NAME=VALUE, got '{}'", raw))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PredictError::Validation(format!(
            "missing feature name in '{}'",
            raw
        )));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Read feature values from a `.json` or `.toml` file.
///
/// Values may be numbers or strings and may sit at the top level or under a
/// `features` table. Everything comes back as raw text, the same as typed
/// input.
pub fn load_inputs(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let root: Value = match ext.as_deref() {
        Some("toml") => {
            let table: toml::Table = toml::from_str(&text)?;
            serde_json::to_value(table)?
        }
        _ => serde_json::from_str(&text)?,
    };

    let table = root
        .get("features")
        .filter(|v| v.is_object())
        .unwrap_or(&root)
        .as_object()
        .ok_or_else(|| {
            PredictError::Validation(format!("{} must contain a table of features", path.display()))
        })?;

    table
        .iter()
        .map(|(name, value)| {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(PredictError::Validation(format!(
                        "feature '{}' must be a number or string, got {}",
                        name, other
                    )))
                }
            };
            Ok((name.clone(), raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("mean radius = 14.2").unwrap(),
            ("mean radius".to_string(), "14.2".to_string())
        );
        assert_eq!(
            parse_assignment("worst area=").unwrap(),
            ("worst area".to_string(), String::new())
        );
        assert!(parse_assignment("mean radius").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_load_inputs_json_nested() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "features": {{ "mean radius": 14.2, "mean area": "700" }} }}"#
        )
        .unwrap();

        let inputs = load_inputs(file.path()).unwrap();
        assert_eq!(inputs["mean radius"], "14.2");
        assert_eq!(inputs["mean area"], "700");
    }

    #[test]
    fn test_load_inputs_toml_flat() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "\"mean radius\" = 14.2").unwrap();
        writeln!(file, "\"worst concavity\" = \"0.3\"").unwrap();

        let inputs = load_inputs(file.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs["worst concavity"], "0.3");
    }

    #[test]
    fn test_load_inputs_rejects_nested_values() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "mean radius": [1, 2] }}"#).unwrap();
        assert!(matches!(
            load_inputs(file.path()),
            Err(PredictError::Validation(_))
        ));
    }

    #[test]
    fn test_cli_parses_feature_command() {
        let cli = Cli::try_parse_from([
            "predict",
            "--json",
            "features",
            "--set",
            "mean radius=14",
            "--set",
            "mean area=700",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Features { set, interactive, .. } => {
                assert_eq!(set.len(), 2);
                assert!(!interactive);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
