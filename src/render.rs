//! Mapping from a feature prediction onto what the user sees.
//!
//! Classification is decided by the label alone: a case-insensitive
//! substring match on "malignant", so variants such as
//! "Malignant (cancerous)" still pick the malignant scheme. Probabilities
//! never influence the colors.

use serde::Serialize;

use crate::domain::PredictionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Malignant,
    Benign,
}

impl Classification {
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("malignant") {
            Classification::Malignant
        } else {
            Classification::Benign
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        match self {
            Classification::Malignant => MALIGNANT_SCHEME,
            Classification::Benign => BENIGN_SCHEME,
        }
    }
}

/// Colors for the diagnosis box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    pub background: &'static str,
    pub color: &'static str,
    pub border_color: &'static str,
}

pub const MALIGNANT_SCHEME: ColorScheme = ColorScheme {
    background: "#FEE2E2",
    color: "#991B1B",
    border_color: "#DC2626",
};

pub const BENIGN_SCHEME: ColorScheme = ColorScheme {
    background: "#D1FAE5",
    color: "#065F46",
    border_color: "#10B981",
};

/// Everything needed to draw a feature result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub label: String,
    pub classification: Classification,
    pub scheme: ColorScheme,
    /// Bar widths in percent
    pub benign_pct: f64,
    pub malignant_pct: f64,
}

impl Presentation {
    pub fn is_malignant(&self) -> bool {
        self.classification == Classification::Malignant
    }

    /// CSS-style width, e.g. "12%"
    pub fn benign_width(&self) -> String {
        format_width(self.benign_pct)
    }

    pub fn malignant_width(&self) -> String {
        format_width(self.malignant_pct)
    }

    /// Score text with one decimal, e.g. "12.0%"
    pub fn benign_text(&self) -> String {
        format!("{:.1}%", self.benign_pct)
    }

    pub fn malignant_text(&self) -> String {
        format!("{:.1}%", self.malignant_pct)
    }
}

/// Pure mapping; the probability is trusted to already be in [0, 1].
pub fn render(result: &PredictionResult) -> Presentation {
    let classification = Classification::from_label(&result.prediction);

    Presentation {
        label: result.prediction.clone(),
        classification,
        scheme: classification.scheme(),
        benign_pct: result.benign_probability * 100.0,
        malignant_pct: result.malignant_probability() * 100.0,
    }
}

// Two decimals, trailing zeros dropped, so float noise like 9.999999999999998
// prints as "10%".
fn format_width(pct: f64) -> String {
    let fixed = format!("{:.2}", pct);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let trimmed = if trimmed == "-0" { "0" } else { trimmed };
    format!("{}%", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str, benign: f64) -> PredictionResult {
        PredictionResult {
            prediction: label.to_string(),
            benign_probability: benign,
        }
    }

    #[test]
    fn test_malignant_bar_widths() {
        let p = render(&result("Malignant", 0.12));
        assert_eq!(p.benign_width(), "12%");
        assert_eq!(p.malignant_width(), "88%");
        assert_eq!(p.benign_text(), "12.0%");
        assert_eq!(p.malignant_text(), "88.0%");
        assert_eq!(p.scheme, MALIGNANT_SCHEME);
    }

    #[test]
    fn test_scheme_ignores_probability() {
        // Label says benign, numbers say otherwise: the label wins.
        let p = render(&result("Benign", 0.01));
        assert_eq!(p.classification, Classification::Benign);
        assert_eq!(p.scheme, BENIGN_SCHEME);

        let p = render(&result("likely MALIGNANT (cancerous)", 0.99));
        assert!(p.is_malignant());
    }

    #[test]
    fn test_width_formatting_absorbs_float_noise() {
        let p = render(&result("Benign", 0.9));
        assert_eq!(p.benign_width(), "90%");
        assert_eq!(p.malignant_width(), "10%");

        let p = render(&result("Benign", 0.333));
        assert_eq!(p.benign_width(), "33.3%");
        assert_eq!(render(&result("Benign", 1.0)).malignant_width(), "0%");
    }
}
