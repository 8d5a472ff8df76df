//! Prompt-driven filling of the feature form.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{PredictError, Result};
use crate::validation::validate;
use crate::workflow::FeatureFormWorkflow;

/// Prompt for every empty field, then keep re-prompting the fields that
/// fail validation until the form would pass.
pub fn fill_form(form: &mut FeatureFormWorkflow) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| PredictError::Prompt(e.to_string()))?;

    println!("\x1b[36mEnter the 10 diagnostic measurements\x1b[0m (Ctrl-D to abort)");

    let mut pending: Vec<&'static str> = form
        .specs()
        .iter()
        .filter(|spec| {
            form.state()
                .inputs
                .get(spec.name)
                .map_or(true, |raw| raw.trim().is_empty())
        })
        .map(|spec| spec.name)
        .collect();

    loop {
        for name in &pending {
            let spec = match form.specs().iter().find(|s| s.name == *name) {
                Some(spec) => *spec,
                None => continue,
            };

            if let Some(message) = form.field_error(name) {
                println!("\x1b[31m  {}\x1b[0m", message);
            }

            let unit = if spec.unit.is_empty() {
                String::new()
            } else {
                format!(" ({})", spec.unit)
            };
            let prompt = format!("{}{} [{}]: ", spec.display_name(), unit, spec.placeholder());

            match rl.readline(&prompt) {
                Ok(line) => form.edit(name, line.trim())?,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    return Err(PredictError::Prompt("input cancelled".to_string()));
                }
                Err(e) => return Err(PredictError::Prompt(e.to_string())),
            }
        }

        let errors = validate(&form.state().inputs, form.specs());
        if errors.is_empty() {
            return Ok(());
        }

        pending = form
            .specs()
            .iter()
            .filter(|spec| errors.contains_key(spec.name))
            .map(|spec| spec.name)
            .collect();
        for spec in form.specs() {
            if let Some(message) = errors.get(spec.name) {
                println!("\x1b[31m✗ {}: {}\x1b[0m", spec.display_name(), message);
            }
        }
    }
}
