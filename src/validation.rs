/// Validation of raw feature-form input
///
/// `validate` is the only gate in front of a feature submission. It is pure:
/// the same inputs always produce the same error map, and it always looks at
/// every spec rather than just the field that changed.
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::FeatureSpec;

/// Per-field validation failure. The first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldError {
    Required,
    NotANumber,
    OutOfRange { min: f64, max: f64 },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => write!(f, "Required"),
            FieldError::NotANumber => write!(f, "Must be a number"),
            FieldError::OutOfRange { min, max } => write!(f, "Range: {}-{}", min, max),
        }
    }
}

/// Classify one raw value against its spec
///
/// # Returns
/// * `None` if the value is acceptable
/// * `Some(FieldError)` for the first rule it breaks
pub fn check_field(raw: Option<&str>, spec: &FeatureSpec) -> Option<FieldError> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Some(FieldError::Required),
    };

    let value = match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Some(FieldError::NotANumber),
    };

    if spec.contains(value) {
        None
    } else {
        Some(FieldError::OutOfRange {
            min: spec.min,
            max: spec.max,
        })
    }
}

/// Validate the complete input mapping
///
/// Fields without an error are absent from the result.
pub fn validate(
    inputs: &BTreeMap<String, String>,
    specs: &[FeatureSpec],
) -> BTreeMap<String, String> {
    specs
        .iter()
        .filter_map(|spec| {
            check_field(inputs.get(spec.name).map(String::as_str), spec)
                .map(|err| (spec.name.to_string(), err.to_string()))
        })
        .collect()
}

pub fn is_valid(inputs: &BTreeMap<String, String>, specs: &[FeatureSpec]) -> bool {
    validate(inputs, specs).is_empty()
}
