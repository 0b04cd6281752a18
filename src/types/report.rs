use crate::classify::{CrossValidation, Prediction, TrainingParams};
use crate::metrics::{EntropyMeasures, MetricsRecord};
use crate::ostrom::OstromScores;
use crate::types::project::CategoryLabel;
use crate::types::scoring::VsmHealth;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Model,
    Heuristic,
}

/// Everything computed for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub id: String,
    pub collected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryLabel>,
    pub metrics: MetricsRecord,
    pub entropy: EntropyMeasures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vsm: Option<VsmHealth>,
    pub ostrom: OstromScores,
    pub prediction: Prediction,
    pub prediction_source: PredictionSource,
}

impl ProjectReport {
    pub fn ostrom_total(&self) -> u32 {
        self.ostrom.values().map(|points| u32::from(*points)).sum()
    }

    /// `Some(true)` when a labeled project was predicted as its own label.
    pub fn prediction_matches(&self) -> Option<bool> {
        self.category.map(|label| label == self.prediction.label)
    }
}

/// A project that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFailure {
    pub id: String,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub projects: Vec<ProjectReport>,
    pub failures: Vec<ProjectFailure>,
}

impl BatchReport {
    /// Share of labeled projects whose prediction equals their label.
    pub fn label_agreement(&self) -> Option<f64> {
        let judged: Vec<bool> = self
            .projects
            .iter()
            .filter_map(ProjectReport::prediction_matches)
            .collect();
        if judged.is_empty() {
            return None;
        }
        let agreed = judged.iter().filter(|matched| **matched).count();
        Some(agreed as f64 / judged.len() as f64)
    }
}

/// Summary of a `train` run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub examples: usize,
    pub class_counts: BTreeMap<CategoryLabel, usize>,
    pub params: TrainingParams,
    pub training_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_validation: Option<CrossValidation>,
    pub feature_importance: Vec<(&'static str, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}
