//! Information-theoretic and inequality measures over contribution counts.

pub mod activity;
pub mod concentration;
pub mod entropy;
pub mod inequality;

pub use activity::{change_entropy, entropy_measures, temporal_entropy, EntropyMeasures};
pub use concentration::{bus_factor, top_k_percentage};
pub use entropy::{normalized_entropy, shannon_entropy};
pub use inequality::gini_coefficient;

use crate::error::{GovernanceError, Result};
use crate::types::project::ContributionDistribution;
use serde::{Deserialize, Serialize};

/// Checks a raw contribution vector and returns its total.
pub(crate) fn validate_counts(counts: &[f64]) -> Result<f64> {
    if counts.is_empty() {
        return Err(GovernanceError::InvalidInput(
            "contribution vector is empty".to_string(),
        ));
    }
    if let Some(bad) = counts.iter().find(|count| !count.is_finite() || **count < 0.0) {
        return Err(GovernanceError::InvalidInput(format!(
            "contribution counts must be finite and non-negative (found {bad})"
        )));
    }
    let total: f64 = counts.iter().sum();
    if !total.is_finite() {
        return Err(GovernanceError::InvalidInput(
            "contribution total overflows; rescale the counts".to_string(),
        ));
    }
    if total <= 0.0 {
        return Err(GovernanceError::InvalidInput(
            "contribution vector sums to zero".to_string(),
        ));
    }
    Ok(total)
}

/// Derived metrics of one contribution distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub contributors: usize,
    pub total_contributions: f64,
    pub entropy: f64,
    pub normalized_entropy: f64,
    pub gini: f64,
    pub bus_factor: usize,
    pub top1_percentage: f64,
    pub top5_percentage: f64,
}

impl MetricsRecord {
    /// The distribution already holds only positive counts.
    pub fn compute(distribution: &ContributionDistribution) -> Result<Self> {
        Self::from_positive(distribution.counts())
    }

    /// Computes the record from raw counts after dropping zero entries.
    pub fn from_counts(counts: &[f64]) -> Result<Self> {
        validate_counts(counts)?;
        let positive: Vec<f64> = counts.iter().copied().filter(|c| *c > 0.0).collect();
        Self::from_positive(&positive)
    }

    fn from_positive(positive: &[f64]) -> Result<Self> {
        Ok(Self {
            contributors: positive.len(),
            total_contributions: validate_counts(positive)?,
            entropy: shannon_entropy(positive)?,
            normalized_entropy: normalized_entropy(positive)?,
            gini: gini_coefficient(positive)?,
            bus_factor: bus_factor(positive)?,
            top1_percentage: top_k_percentage(positive, 1)?,
            top5_percentage: top_k_percentage(positive, 5)?,
        })
    }
}
