use super::{
    class_counts, Features, LabeledExample, Prediction, CLASS_COUNT, FEATURE_COUNT,
    MIN_EXAMPLES_PER_CLASS,
};
use crate::error::{GovernanceError, Result};
use crate::types::project::CategoryLabel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn default_learning_rate() -> f64 {
    0.5
}

fn default_epochs() -> u32 {
    2000
}

fn default_l2_penalty() -> f64 {
    1e-3
}

/// Gradient-descent settings for [`LogisticModel::train`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            l2_penalty: default_l2_penalty(),
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(GovernanceError::Configuration(format!(
                "classifier.learning_rate must be positive (found {})",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(GovernanceError::Configuration(
                "classifier.epochs must be greater than 0".to_string(),
            ));
        }
        if !self.l2_penalty.is_finite() || self.l2_penalty < 0.0 {
            return Err(GovernanceError::Configuration(format!(
                "classifier.l2_penalty must be non-negative (found {})",
                self.l2_penalty
            )));
        }
        Ok(())
    }
}

/// Multinomial logistic regression over standardized features.
///
/// Immutable once trained; retraining builds a fresh model from the full
/// labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelRecord")]
pub struct LogisticModel {
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
    weights: [[f64; FEATURE_COUNT]; CLASS_COUNT],
    biases: [f64; CLASS_COUNT],
}

/// Unchecked on-disk form of a trained model.
#[derive(Debug, Deserialize)]
struct ModelRecord {
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
    weights: [[f64; FEATURE_COUNT]; CLASS_COUNT],
    biases: [f64; CLASS_COUNT],
}

impl TryFrom<ModelRecord> for LogisticModel {
    type Error = GovernanceError;

    fn try_from(record: ModelRecord) -> Result<Self> {
        let finite = |name: &str, values: &[f64]| -> Result<()> {
            match values.iter().find(|value| !value.is_finite()) {
                Some(bad) => Err(GovernanceError::Configuration(format!(
                    "model {name} must be finite (found {bad})"
                ))),
                None => Ok(()),
            }
        };
        finite("means", &record.means)?;
        finite("biases", &record.biases)?;
        for row in &record.weights {
            finite("weights", row)?;
        }
        if let Some(bad) = record
            .scales
            .iter()
            .find(|scale| !scale.is_finite() || **scale <= 0.0)
        {
            return Err(GovernanceError::Configuration(format!(
                "model scales must be finite and positive (found {bad})"
            )));
        }

        Ok(Self {
            means: record.means,
            scales: record.scales,
            weights: record.weights,
            biases: record.biases,
        })
    }
}

fn softmax(logits: &[f64; CLASS_COUNT]) -> [f64; CLASS_COUNT] {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out = [0.0; CLASS_COUNT];
    let mut sum = 0.0;
    for (slot, logit) in out.iter_mut().zip(logits) {
        *slot = (logit - max).exp();
        sum += *slot;
    }
    for slot in &mut out {
        *slot /= sum;
    }
    out
}

impl LogisticModel {
    /// Parses a model written by `train --out`. Structural and numeric
    /// problems are both reported as configuration errors.
    pub fn from_json(content: &str) -> Result<Self> {
        let record: ModelRecord = serde_json::from_str(content)
            .map_err(|e| GovernanceError::Configuration(format!("model file: {e}")))?;
        Self::try_from(record)
    }

    pub fn train(examples: &[LabeledExample], params: &TrainingParams) -> Result<Self> {
        params.validate()?;
        class_counts(examples, MIN_EXAMPLES_PER_CLASS)?;
        for example in examples {
            example.features.validate()?;
        }

        let n = examples.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for example in examples {
            for (mean, value) in means.iter_mut().zip(example.features.as_array()) {
                *mean += value / n;
            }
        }
        let mut scales = [0.0; FEATURE_COUNT];
        for example in examples {
            for (j, value) in example.features.as_array().iter().enumerate() {
                scales[j] += (value - means[j]).powi(2) / n;
            }
        }
        for scale in &mut scales {
            // Constant features carry no signal; keep them centred at zero.
            *scale = if *scale > f64::EPSILON { scale.sqrt() } else { 1.0 };
        }

        let mut model = Self {
            means,
            scales,
            weights: [[0.0; FEATURE_COUNT]; CLASS_COUNT],
            biases: [0.0; CLASS_COUNT],
        };
        let inputs: Vec<([f64; FEATURE_COUNT], usize)> = examples
            .iter()
            .map(|example| (model.standardize(&example.features), example.label.index()))
            .collect();

        for epoch in 0..params.epochs {
            let mut grad_w = [[0.0; FEATURE_COUNT]; CLASS_COUNT];
            let mut grad_b = [0.0; CLASS_COUNT];
            let mut loss = 0.0;

            for (x, class) in &inputs {
                let probabilities = softmax(&model.logits(x));
                loss -= probabilities[*class].max(f64::MIN_POSITIVE).ln();
                for k in 0..CLASS_COUNT {
                    let target = if k == *class { 1.0 } else { 0.0 };
                    let error = probabilities[k] - target;
                    grad_b[k] += error;
                    for j in 0..FEATURE_COUNT {
                        grad_w[k][j] += error * x[j];
                    }
                }
            }

            for k in 0..CLASS_COUNT {
                model.biases[k] -= params.learning_rate * grad_b[k] / n;
                for j in 0..FEATURE_COUNT {
                    let gradient = grad_w[k][j] / n + params.l2_penalty * model.weights[k][j];
                    model.weights[k][j] -= params.learning_rate * gradient;
                }
            }

            if epoch % 500 == 0 {
                debug!(epoch, loss = loss / n, "classifier training progress");
            }
        }

        info!(
            examples = examples.len(),
            epochs = params.epochs,
            "trained logistic classifier"
        );
        Ok(model)
    }

    fn standardize(&self, features: &Features) -> [f64; FEATURE_COUNT] {
        let raw = features.as_array();
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = (raw[j] - self.means[j]) / self.scales[j];
        }
        out
    }

    fn logits(&self, x: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut logits = self.biases;
        for (k, logit) in logits.iter_mut().enumerate() {
            *logit += self.weights[k]
                .iter()
                .zip(x)
                .map(|(w, v)| w * v)
                .sum::<f64>();
        }
        logits
    }

    pub fn probabilities(&self, features: &Features) -> Result<[f64; CLASS_COUNT]> {
        features.validate()?;
        Ok(softmax(&self.logits(&self.standardize(features))))
    }

    pub fn classify(&self, features: &Features) -> Result<Prediction> {
        let probabilities = self.probabilities(features)?;
        let mut best = 0;
        for k in 1..CLASS_COUNT {
            if probabilities[k] > probabilities[best] {
                best = k;
            }
        }
        let label = CategoryLabel::from_index(best).ok_or_else(|| {
            GovernanceError::InvalidInput(format!("class index {best} out of range"))
        })?;

        Ok(Prediction {
            label,
            confidence: probabilities[best],
            probabilities: CategoryLabel::ALL
                .iter()
                .map(|label| (*label, probabilities[label.index()]))
                .collect(),
        })
    }

    /// Relative weight of each feature, as the mean absolute standardized
    /// coefficient across classes normalized to sum to one.
    pub fn feature_importance(&self) -> Vec<(&'static str, f64)> {
        let mut magnitudes = [0.0; FEATURE_COUNT];
        for row in &self.weights {
            for (magnitude, weight) in magnitudes.iter_mut().zip(row) {
                *magnitude += weight.abs() / CLASS_COUNT as f64;
            }
        }
        let total: f64 = magnitudes.iter().sum();
        Features::NAMES
            .iter()
            .zip(magnitudes)
            .map(|(name, magnitude)| {
                let share = if total > 0.0 { magnitude / total } else { 0.0 };
                (*name, share)
            })
            .collect()
    }
}
