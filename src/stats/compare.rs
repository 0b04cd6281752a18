use super::{cohens_d, kruskal_wallis, mann_whitney_u, spearman, TestOutcome};
use crate::error::{GovernanceError, Result};
use crate::metrics::MetricsRecord;
use crate::types::project::CategoryLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A single field of [`MetricsRecord`] to compare across archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Entropy,
    NormalizedEntropy,
    Gini,
    BusFactor,
    Top1Percentage,
    Top5Percentage,
}

impl MetricKind {
    pub fn value(self, record: &MetricsRecord) -> f64 {
        match self {
            Self::Entropy => record.entropy,
            Self::NormalizedEntropy => record.normalized_entropy,
            Self::Gini => record.gini,
            Self::BusFactor => record.bus_factor as f64,
            Self::Top1Percentage => record.top1_percentage,
            Self::Top5Percentage => record.top5_percentage,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entropy => "entropy",
            Self::NormalizedEntropy => "normalized_entropy",
            Self::Gini => "gini",
            Self::BusFactor => "bus_factor",
            Self::Top1Percentage => "top1_percentage",
            Self::Top5Percentage => "top5_percentage",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = GovernanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "entropy" => Ok(Self::Entropy),
            "normalized_entropy" => Ok(Self::NormalizedEntropy),
            "gini" => Ok(Self::Gini),
            "bus_factor" => Ok(Self::BusFactor),
            "top1_percentage" => Ok(Self::Top1Percentage),
            "top5_percentage" => Ok(Self::Top5Percentage),
            other => Err(GovernanceError::InvalidInput(format!("unknown metric: {other}"))),
        }
    }
}

/// Comparison of two neighbouring archetypes on the gradient.
#[derive(Debug, Clone, Serialize)]
pub struct PairComparison {
    pub lower: CategoryLabel,
    pub upper: CategoryLabel,
    pub mann_whitney: TestOutcome,
    /// `None` when both groups have zero variance.
    pub cohens_d: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryComparison {
    pub metric: MetricKind,
    pub group_sizes: BTreeMap<CategoryLabel, usize>,
    pub medians: BTreeMap<CategoryLabel, f64>,
    pub kruskal_wallis: TestOutcome,
    pub adjacent_pairs: Vec<PairComparison>,
    /// Correlation between the metric and the Toy → Federation rank.
    pub gradient_correlation: Option<TestOutcome>,
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Tests whether `metric` differs across the archetypes present in
/// `samples`.
pub fn compare_categories(
    samples: &[(CategoryLabel, MetricsRecord)],
    metric: MetricKind,
) -> Result<CategoryComparison> {
    let mut groups: BTreeMap<CategoryLabel, Vec<f64>> = BTreeMap::new();
    for (label, record) in samples {
        groups.entry(*label).or_default().push(metric.value(record));
    }
    if groups.len() < 2 {
        return Err(GovernanceError::InsufficientData(format!(
            "comparing {metric} needs at least two categories with labeled projects (found {})",
            groups.len()
        )));
    }

    let ordered: Vec<(CategoryLabel, &[f64])> = CategoryLabel::GRADIENT
        .iter()
        .filter_map(|label| groups.get(label).map(|values| (*label, values.as_slice())))
        .collect();
    let slices: Vec<&[f64]> = ordered.iter().map(|(_, values)| *values).collect();
    let kruskal = kruskal_wallis(&slices)?;

    let mut adjacent_pairs = Vec::new();
    for window in ordered.windows(2) {
        let (lower, lower_values) = window[0];
        let (upper, upper_values) = window[1];
        let mann_whitney = mann_whitney_u(upper_values, lower_values)?;
        let effect = cohens_d(upper_values, lower_values).ok();
        debug!(%lower, %upper, p = mann_whitney.p_value, "adjacent archetype comparison");
        adjacent_pairs.push(PairComparison {
            lower,
            upper,
            mann_whitney,
            cohens_d: effect,
        });
    }

    let ranks: Vec<f64> = samples
        .iter()
        .map(|(label, _)| label.gradient_rank() as f64)
        .collect();
    let values: Vec<f64> = samples.iter().map(|(_, record)| metric.value(record)).collect();
    let gradient_correlation = match spearman(&values, &ranks) {
        Ok(outcome) => Some(outcome),
        Err(GovernanceError::InvalidInput(reason)) => {
            debug!(%reason, "gradient correlation undefined");
            None
        }
        Err(other) => return Err(other),
    };

    Ok(CategoryComparison {
        metric,
        group_sizes: groups
            .iter()
            .map(|(label, values)| (*label, values.len()))
            .collect(),
        medians: groups
            .iter()
            .map(|(label, values)| (*label, median(values)))
            .collect(),
        kruskal_wallis: kruskal,
        adjacent_pairs,
        gradient_correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(label: CategoryLabel, counts: &[f64]) -> (CategoryLabel, MetricsRecord) {
        (label, MetricsRecord::from_counts(counts).expect("record"))
    }

    fn gradient_samples() -> Vec<(CategoryLabel, MetricsRecord)> {
        vec![
            sample(CategoryLabel::Toy, &[100.0, 2.0]),
            sample(CategoryLabel::Toy, &[80.0, 1.0, 1.0]),
            sample(CategoryLabel::Toy, &[50.0]),
            sample(CategoryLabel::Club, &[50.0, 30.0, 10.0, 5.0]),
            sample(CategoryLabel::Club, &[60.0, 20.0, 20.0, 5.0]),
            sample(CategoryLabel::Club, &[40.0, 40.0, 10.0]),
            sample(CategoryLabel::Stadium, &[20.0, 18.0, 15.0, 12.0, 10.0, 8.0]),
            sample(CategoryLabel::Stadium, &[25.0, 20.0, 15.0, 15.0, 10.0, 5.0]),
            sample(CategoryLabel::Stadium, &[22.0, 20.0, 18.0, 14.0, 12.0]),
            sample(CategoryLabel::Federation, &[10.0; 20]),
            sample(CategoryLabel::Federation, &[12.0, 11.0, 10.0, 10.0, 9.0, 9.0, 8.0, 8.0]),
            sample(CategoryLabel::Federation, &[5.0; 12]),
        ]
    }

    #[test]
    fn normalized_entropy_rises_along_the_gradient() {
        let comparison = compare_categories(&gradient_samples(), MetricKind::NormalizedEntropy)
            .expect("comparison");
        assert_eq!(comparison.group_sizes.len(), 4);
        assert_eq!(comparison.adjacent_pairs.len(), 3);
        assert_eq!(comparison.adjacent_pairs[0].lower, CategoryLabel::Toy);
        assert_eq!(comparison.adjacent_pairs[0].upper, CategoryLabel::Club);
        assert!(comparison.kruskal_wallis.p_value < 0.05);
        let correlation = comparison.gradient_correlation.expect("correlation");
        assert!(correlation.statistic > 0.8);
    }

    #[test]
    fn identical_groups_leave_effect_size_undefined() {
        let samples = vec![
            sample(CategoryLabel::Toy, &[9.0]),
            sample(CategoryLabel::Toy, &[4.0]),
            sample(CategoryLabel::Federation, &[3.0, 3.0, 3.0, 3.0]),
            sample(CategoryLabel::Federation, &[1.0, 1.0, 1.0, 1.0]),
        ];
        let comparison =
            compare_categories(&samples, MetricKind::BusFactor).expect("comparison");
        assert_eq!(comparison.medians[&CategoryLabel::Toy], 1.0);
        assert_eq!(comparison.medians[&CategoryLabel::Federation], 2.0);
        assert!(comparison.adjacent_pairs[0].cohens_d.is_none());
    }

    #[test]
    fn single_category_is_insufficient() {
        let samples = vec![
            sample(CategoryLabel::Club, &[1.0, 2.0]),
            sample(CategoryLabel::Club, &[3.0, 2.0]),
        ];
        assert!(matches!(
            compare_categories(&samples, MetricKind::Gini),
            Err(GovernanceError::InsufficientData(_))
        ));
    }

    #[test]
    fn metric_names_parse() {
        assert_eq!(
            "bus_factor".parse::<MetricKind>().expect("metric"),
            MetricKind::BusFactor
        );
        assert!("stars".parse::<MetricKind>().is_err());
    }
}
