//! Group comparison statistics used to check the archetype gradient.
//!
//! Rank-based tests use mid-ranks with the standard tie correction; many
//! small repositories share identical contribution counts, and the untied
//! formulas overstate p-values for them.

pub mod compare;
pub mod ranks;

pub use compare::{compare_categories, CategoryComparison, MetricKind, PairComparison};

use crate::error::{GovernanceError, Result};
use ranks::midranks;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

/// Test statistic with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

fn check_sample(name: &str, values: &[f64], minimum: usize) -> Result<()> {
    if values.len() < minimum {
        return Err(GovernanceError::InvalidInput(format!(
            "{name} needs at least {minimum} value(s) (found {})",
            values.len()
        )));
    }
    if let Some(bad) = values.iter().find(|value| !value.is_finite()) {
        return Err(GovernanceError::InvalidInput(format!(
            "{name} contains a non-finite value ({bad})"
        )));
    }
    Ok(())
}

fn distribution_error(err: impl std::fmt::Display) -> GovernanceError {
    GovernanceError::InvalidInput(format!("invalid reference distribution: {err}"))
}

/// Mann-Whitney U test, normal approximation with tie-corrected variance
/// and continuity correction. The statistic is U for `group_a`.
pub fn mann_whitney_u(group_a: &[f64], group_b: &[f64]) -> Result<TestOutcome> {
    check_sample("group_a", group_a, 1)?;
    check_sample("group_b", group_b, 1)?;

    let n1 = group_a.len() as f64;
    let n2 = group_b.len() as f64;
    let n = n1 + n2;
    let combined: Vec<f64> = group_a.iter().chain(group_b).copied().collect();
    let (ranks, tie_term) = midranks(&combined);

    let rank_sum_a: f64 = ranks[..group_a.len()].iter().sum();
    let u_a = rank_sum_a - n1 * (n1 + 1.0) / 2.0;
    let mean = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    if variance <= 0.0 {
        // Every observation tied: no evidence of a shift.
        return Ok(TestOutcome {
            statistic: u_a,
            p_value: 1.0,
        });
    }

    let z = ((u_a - mean).abs() - 0.5).max(0.0) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).map_err(distribution_error)?;
    Ok(TestOutcome {
        statistic: u_a,
        p_value: (2.0 * normal.sf(z)).min(1.0),
    })
}

/// Cohen's d with pooled standard deviation; positive when `group_a` has
/// the larger mean.
pub fn cohens_d(group_a: &[f64], group_b: &[f64]) -> Result<f64> {
    check_sample("group_a", group_a, 2)?;
    check_sample("group_b", group_b, 2)?;

    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let sample_variance = |values: &[f64], mean: f64| {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
    };

    let (mean_a, mean_b) = (mean(group_a), mean(group_b));
    let n1 = group_a.len() as f64;
    let n2 = group_b.len() as f64;
    let pooled = (((n1 - 1.0) * sample_variance(group_a, mean_a)
        + (n2 - 1.0) * sample_variance(group_b, mean_b))
        / (n1 + n2 - 2.0))
        .sqrt();

    if pooled <= 0.0 {
        return Err(GovernanceError::InvalidInput(
            "cohen's d is undefined when both groups have zero variance".to_string(),
        ));
    }
    Ok((mean_a - mean_b) / pooled)
}

/// Kruskal-Wallis H test across two or more groups, tie-corrected,
/// p-value from χ² with k − 1 degrees of freedom.
pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<TestOutcome> {
    if groups.len() < 2 {
        return Err(GovernanceError::InvalidInput(format!(
            "kruskal-wallis needs at least 2 groups (found {})",
            groups.len()
        )));
    }
    for (index, group) in groups.iter().enumerate() {
        check_sample(&format!("group {index}"), group, 1)?;
    }

    let combined: Vec<f64> = groups.iter().flat_map(|group| group.iter().copied()).collect();
    let n = combined.len() as f64;
    let (ranks, tie_term) = midranks(&combined);

    let correction = 1.0 - tie_term / (n.powi(3) - n);
    if correction <= 0.0 {
        return Err(GovernanceError::InvalidInput(
            "kruskal-wallis is undefined when all values are identical".to_string(),
        ));
    }

    let mut offset = 0;
    let mut weighted = 0.0;
    for group in groups {
        let rank_sum: f64 = ranks[offset..offset + group.len()].iter().sum();
        weighted += rank_sum * rank_sum / group.len() as f64;
        offset += group.len();
    }
    let h = (12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0)) / correction;
    let h = h.max(0.0);

    let chi = ChiSquared::new((groups.len() - 1) as f64).map_err(distribution_error)?;
    Ok(TestOutcome {
        statistic: h,
        p_value: chi.sf(h).clamp(0.0, 1.0),
    })
}

/// Spearman rank correlation with a two-sided t-approximation p-value.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<TestOutcome> {
    if x.len() != y.len() {
        return Err(GovernanceError::InvalidInput(format!(
            "spearman needs paired samples (found {} and {})",
            x.len(),
            y.len()
        )));
    }
    check_sample("x", x, 3)?;
    check_sample("y", y, 3)?;

    let (rx, _) = midranks(x);
    let (ry, _) = midranks(y);
    let n = x.len() as f64;
    let mean = (n + 1.0) / 2.0;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in rx.iter().zip(&ry) {
        covariance += (a - mean) * (b - mean);
        var_x += (a - mean).powi(2);
        var_y += (b - mean).powi(2);
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return Err(GovernanceError::InvalidInput(
            "spearman correlation is undefined for a constant variable".to_string(),
        ));
    }

    let rho = (covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0);
    let df = n - 2.0;
    let p_value = if (1.0 - rho.abs()) < 1e-12 {
        0.0
    } else {
        let t = rho * (df / (1.0 - rho * rho)).sqrt();
        let students = StudentsT::new(0.0, 1.0, df).map_err(distribution_error)?;
        (2.0 * students.sf(t.abs())).min(1.0)
    };

    Ok(TestOutcome {
        statistic: rho,
        p_value,
    })
}
