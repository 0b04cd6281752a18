use super::{class_counts, LabeledExample, LogisticModel, TrainingParams, CLASS_COUNT};
use super::MIN_EXAMPLES_PER_CLASS;
use crate::error::{GovernanceError, Result};
use crate::types::project::CategoryLabel;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of stratified k-fold cross-validation.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation {
    pub folds: usize,
    pub accuracy: f64,
    pub fold_accuracies: Vec<f64>,
    /// `confusion[actual][predicted]`, indexed by [`CategoryLabel::index`].
    pub confusion: [[usize; CLASS_COUNT]; CLASS_COUNT],
}

impl CrossValidation {
    pub fn recall(&self, label: CategoryLabel) -> Option<f64> {
        let row = &self.confusion[label.index()];
        let total: usize = row.iter().sum();
        (total > 0).then(|| row[label.index()] as f64 / total as f64)
    }
}

/// Assigns every example a fold so that each class is spread evenly.
fn stratify(examples: &[LabeledExample], folds: usize) -> Vec<usize> {
    let mut assignment = vec![0; examples.len()];
    let mut next = 0;
    for label in CategoryLabel::ALL {
        for (index, example) in examples.iter().enumerate() {
            if example.label == label {
                assignment[index] = next % folds;
                next += 1;
            }
        }
    }
    assignment
}

pub fn cross_validate(
    examples: &[LabeledExample],
    folds: usize,
    params: &TrainingParams,
) -> Result<CrossValidation> {
    if folds < 2 {
        return Err(GovernanceError::Configuration(format!(
            "cross-validation needs at least 2 folds (found {folds})"
        )));
    }
    let counts = class_counts(examples, MIN_EXAMPLES_PER_CLASS)?;
    for label in CategoryLabel::ALL {
        let count = counts[label.index()];
        let held_out = count.div_ceil(folds);
        if count - held_out < MIN_EXAMPLES_PER_CLASS {
            return Err(GovernanceError::InsufficientData(format!(
                "{count} {label} example(s) cannot leave {MIN_EXAMPLES_PER_CLASS} for training in {folds}-fold cross-validation"
            )));
        }
    }

    let assignment = stratify(examples, folds);
    let mut confusion = [[0usize; CLASS_COUNT]; CLASS_COUNT];
    let mut fold_accuracies = Vec::with_capacity(folds);

    for fold in 0..folds {
        let (train, test): (Vec<_>, Vec<_>) = examples
            .iter()
            .zip(&assignment)
            .partition(|(_, assigned)| **assigned != fold);
        let train: Vec<LabeledExample> = train.into_iter().map(|(example, _)| *example).collect();

        let model = LogisticModel::train(&train, params)?;
        let mut correct = 0;
        for (example, _) in &test {
            let prediction = model.classify(&example.features)?;
            confusion[example.label.index()][prediction.label.index()] += 1;
            if prediction.label == example.label {
                correct += 1;
            }
        }
        let accuracy = if test.is_empty() {
            0.0
        } else {
            correct as f64 / test.len() as f64
        };
        debug!(fold, held_out = test.len(), accuracy, "cross-validation fold");
        fold_accuracies.push(accuracy);
    }

    let total: usize = confusion.iter().flatten().sum();
    let correct: usize = (0..CLASS_COUNT).map(|k| confusion[k][k]).sum();
    let accuracy = correct as f64 / total as f64;
    info!(folds, accuracy, "cross-validation complete");

    Ok(CrossValidation {
        folds,
        accuracy,
        fold_accuracies,
        confusion,
    })
}
