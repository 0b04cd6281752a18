//! Governance archetype classification.

pub mod heuristic;
pub mod model;
pub mod validation;

pub use heuristic::classify_heuristic;
pub use model::{LogisticModel, TrainingParams};
pub use validation::{cross_validate, CrossValidation};

use crate::error::{GovernanceError, Result};
use crate::metrics::MetricsRecord;
use crate::types::project::CategoryLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FEATURE_COUNT: usize = 3;
pub const CLASS_COUNT: usize = 4;
pub const MIN_EXAMPLES_PER_CLASS: usize = 2;

/// Model inputs derived from a metrics record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub normalized_entropy: f64,
    pub gini: f64,
    pub top1_percentage: f64,
}

impl Features {
    pub const NAMES: [&'static str; FEATURE_COUNT] =
        ["normalized_entropy", "gini", "top1_percentage"];

    pub fn new(normalized_entropy: f64, gini: f64, top1_percentage: f64) -> Self {
        Self {
            normalized_entropy,
            gini,
            top1_percentage,
        }
    }

    pub fn from_metrics(record: &MetricsRecord) -> Self {
        Self::new(record.normalized_entropy, record.gini, record.top1_percentage)
    }

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.normalized_entropy, self.gini, self.top1_percentage]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in Self::NAMES.iter().zip(self.as_array()) {
            if !value.is_finite() {
                return Err(GovernanceError::InvalidInput(format!(
                    "feature {name} must be finite (found {value})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub features: Features,
    pub label: CategoryLabel,
}

impl LabeledExample {
    pub fn new(features: Features, label: CategoryLabel) -> Self {
        Self { features, label }
    }
}

/// Predicted archetype with the probability assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: CategoryLabel,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub probabilities: BTreeMap<CategoryLabel, f64>,
}

/// Counts examples per class, failing when any class falls below `minimum`.
pub(crate) fn class_counts(
    examples: &[LabeledExample],
    minimum: usize,
) -> Result<[usize; CLASS_COUNT]> {
    let mut counts = [0usize; CLASS_COUNT];
    for example in examples {
        counts[example.label.index()] += 1;
    }
    let short = CategoryLabel::ALL
        .iter()
        .filter(|label| counts[label.index()] < minimum)
        .map(|label| format!("{label} ({})", counts[label.index()]))
        .collect::<Vec<_>>();
    if !short.is_empty() {
        return Err(GovernanceError::InsufficientData(format!(
            "need at least {minimum} labeled examples per category; short: {}",
            short.join(", ")
        )));
    }
    Ok(counts)
}
