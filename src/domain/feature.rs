use serde::Serialize;

/// Static descriptor for one diagnostic input field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    /// Key sent to the service, e.g. "mean radius"
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    /// Display unit; empty for dimensionless measurements
    pub unit: &'static str,
    pub description: &'static str,
}

impl FeatureSpec {
    /// Title-cased label ("mean radius" -> "Mean Radius")
    pub fn display_name(&self) -> String {
        self.name
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Input hint, e.g. "6 - 28"
    pub fn placeholder(&self) -> String {
        format!("{} - {}", self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The ten features the breast cancer model is trained on.
pub const FEATURE_SPECS: [FeatureSpec; 10] = [
    FeatureSpec {
        name: "mean radius",
        min: 6.0,
        max: 28.0,
        unit: "mm",
        description: "Mean of distances from center to points on perimeter",
    },
    FeatureSpec {
        name: "mean perimeter",
        min: 40.0,
        max: 190.0,
        unit: "mm",
        description: "Mean perimeter of the tumor",
    },
    FeatureSpec {
        name: "mean area",
        min: 150.0,
        max: 2500.0,
        unit: "mm²",
        description: "Mean area of the tumor",
    },
    FeatureSpec {
        name: "mean concavity",
        min: 0.0,
        max: 0.45,
        unit: "",
        description: "Severity of concave portions of contour",
    },
    FeatureSpec {
        name: "mean concave points",
        min: 0.0,
        max: 0.20,
        unit: "",
        description: "Number of concave portions of contour",
    },
    FeatureSpec {
        name: "worst radius",
        min: 7.0,
        max: 36.0,
        unit: "mm",
        description: "Worst (largest) mean of distances",
    },
    FeatureSpec {
        name: "worst perimeter",
        min: 50.0,
        max: 250.0,
        unit: "mm",
        description: "Worst (largest) perimeter",
    },
    FeatureSpec {
        name: "worst area",
        min: 200.0,
        max: 4250.0,
        unit: "mm²",
        description: "Worst (largest) area",
    },
    FeatureSpec {
        name: "worst concavity",
        min: 0.0,
        max: 1.25,
        unit: "",
        description: "Worst concavity measurement",
    },
    FeatureSpec {
        name: "worst concave points",
        min: 0.0,
        max: 0.30,
        unit: "",
        description: "Worst concave points measurement",
    },
];

pub fn find_spec<'a>(specs: &'a [FeatureSpec], name: &str) -> Option<&'a FeatureSpec> {
    specs.iter().find(|spec| spec.name == name)
}
