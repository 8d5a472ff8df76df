//! Output formatting for `predict` commands.
//!
//! Supports two modes: colored terminal output (default) and JSON (--json).

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde_json::{json, Value};
use std::io::{stdout, Write};
use std::path::Path;
use tabled::{Table, Tabled};

use crate::domain::{FeatureSpec, SubmissionStatus};
use crate::error::Result;
use crate::render::Presentation;
use crate::workflow::{FeatureFormWorkflow, ImageUploadWorkflow};

const BAR_WIDTH: usize = 40;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Feature")]
    name: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn print_specs(specs: &[FeatureSpec], mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Pretty => {
            let rows: Vec<SpecRow> = specs
                .iter()
                .map(|spec| SpecRow {
                    name: spec.name.to_string(),
                    unit: spec.unit.to_string(),
                    range: spec.placeholder(),
                    description: spec.description.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(specs)?);
        }
    }
    Ok(())
}

pub fn print_form(form: &FeatureFormWorkflow, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Json {
        let doc = json!({
            "state": form.state(),
            "presentation": form.presentation(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let mut stdout = stdout();
    let state = form.state();

    for spec in form.specs() {
        if let Some(message) = state.validation_errors.get(spec.name) {
            execute!(
                stdout,
                SetForegroundColor(Color::Red),
                Print(format!("  ✗ {:<22} {}\n", spec.display_name(), message)),
                ResetColor
            )?;
        }
    }

    if let Some(ref error) = state.last_error {
        print_error(error)?;
    }

    if let Some(presentation) = form.presentation() {
        print_presentation(&presentation)?;
    }

    stdout.flush()?;
    Ok(())
}

fn print_presentation(p: &Presentation) -> Result<()> {
    let mut stdout = stdout();
    let color = if p.is_malignant() {
        Color::Red
    } else {
        Color::Green
    };

    execute!(
        stdout,
        Print("\nDiagnosis: "),
        SetForegroundColor(color),
        Print(format!("{}\n\n", p.label)),
        ResetColor
    )?;

    execute!(
        stdout,
        Print(format!("  Benign (Non-cancerous)  {:>6}  ", p.benign_text())),
        SetForegroundColor(Color::Green),
        Print(format!("{}\n", bar(p.benign_pct))),
        ResetColor,
        Print(format!("  Malignant (Cancerous)   {:>6}  ", p.malignant_text())),
        SetForegroundColor(Color::Red),
        Print(format!("{}\n", bar(p.malignant_pct))),
        ResetColor
    )?;

    Ok(())
}

pub fn print_upload(upload: &ImageUploadWorkflow, mode: OutputMode) -> Result<()> {
    let state = upload.state();

    if mode == OutputMode::Json {
        let doc = json!({
            "phase": upload.phase(),
            "state": state,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let file = state
        .selected_file
        .as_ref()
        .map(|f| f.file_name.as_str())
        .unwrap_or("(none)");

    match (state.submission_status, &state.predicted_label, &state.last_error) {
        (SubmissionStatus::Succeeded, Some(label), _) => {
            execute!(
                stdout(),
                Print(format!("{:<28} ", file)),
                SetForegroundColor(Color::Green),
                Print(format!("Predicted character: {}\n", label)),
                ResetColor
            )?;
        }
        (_, _, Some(error)) => {
            execute!(stdout(), Print(format!("{:<28} ", file)))?;
            print_error(error)?;
        }
        (status, _, _) => {
            execute!(stdout(), Print(format!("{:<28} {}\n", file, status)))?;
        }
    }

    Ok(())
}

pub fn print_error(message: &str) -> Result<()> {
    execute!(
        stdout(),
        SetForegroundColor(Color::Red),
        Print(format!("⚠ {}\n", message)),
        ResetColor
    )?;
    Ok(())
}

/// Report a failure that has no workflow state to show. In JSON mode this is
/// an `{"error": ..}` object so stdout stays parseable.
pub fn print_failure(message: &str, file: Option<&Path>, mode: OutputMode) -> Result<()> {
    match (mode, file) {
        (OutputMode::Json, _) => {
            println!("{}", serde_json::to_string_pretty(&failure_doc(message, file))?);
            Ok(())
        }
        (OutputMode::Pretty, Some(path)) => {
            print_error(&format!("{}: {}", path.display(), message))
        }
        (OutputMode::Pretty, None) => print_error(message),
    }
}

fn failure_doc(message: &str, file: Option<&Path>) -> Value {
    let mut doc = json!({ "error": message });
    if let Some(path) = file {
        doc["file"] = json!(path.display().to_string());
    }
    doc
}

fn bar(pct: f64) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(0.0).chars().filter(|c| *c == '█').count(), 0);
        assert_eq!(bar(50.0).chars().filter(|c| *c == '█').count(), 20);
        assert_eq!(bar(100.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(140.0).chars().filter(|c| *c == '░').count(), 0);
    }

    #[test]
    fn test_failure_doc_names_the_file() {
        assert_eq!(
            failure_doc("Unsupported file type: text/plain", Some(Path::new("notes.txt"))),
            json!({ "error": "Unsupported file type: text/plain", "file": "notes.txt" })
        );
        assert_eq!(
            failure_doc("connection refused", None),
            json!({ "error": "connection refused" })
        );
    }

    #[test]
    fn test_output_mode_flag() {
        assert_eq!(OutputMode::from_json_flag(true), OutputMode::Json);
        assert_eq!(OutputMode::from_json_flag(false), OutputMode::Pretty);
    }
}
