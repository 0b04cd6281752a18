use super::validate_counts;
use crate::error::Result;

/// Gini coefficient, G = Σᵢ Σⱼ |xᵢ − xⱼ| / (2 n² mean).
///
/// Evaluated through the sorted-rank identity
/// G = Σᵢ (2i − n − 1) x₍ᵢ₎ / (n Σx), which gives the same value as the
/// pairwise sum in O(n log n).
pub fn gini_coefficient(counts: &[f64]) -> Result<f64> {
    let total = validate_counts(counts)?;
    let n = counts.len();
    if n == 1 {
        return Ok(0.0);
    }

    let mut sorted = counts.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n_f = n as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, value)| (2.0 * (i as f64 + 1.0) - n_f - 1.0) * value)
        .sum();

    Ok((weighted / (n_f * total)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;

    fn pairwise_gini(counts: &[f64]) -> f64 {
        let n = counts.len() as f64;
        let mean = counts.iter().sum::<f64>() / n;
        let mut diffs = 0.0;
        for a in counts {
            for b in counts {
                diffs += (a - b).abs();
            }
        }
        diffs / (2.0 * n * n * mean)
    }

    #[test]
    fn equal_shares_have_zero_gini() {
        assert_eq!(gini_coefficient(&[25.0, 25.0, 25.0, 25.0]).expect("gini"), 0.0);
        assert_eq!(gini_coefficient(&[7.0]).expect("gini"), 0.0);
    }

    #[test]
    fn single_nonzero_matches_closed_form() {
        for n in 2..=50 {
            let mut counts = vec![0.0; n];
            counts[n / 2] = 13.0;
            let gini = gini_coefficient(&counts).expect("gini");
            let expected = (n as f64 - 1.0) / n as f64;
            assert!((gini - expected).abs() < 1e-12, "n={n}: {gini} vs {expected}");
        }
    }

    #[test]
    fn sorted_formula_matches_pairwise_definition() {
        let samples: [&[f64]; 4] = [
            &[40.0, 25.0, 20.0, 10.0, 5.0],
            &[95.0, 3.0, 2.0],
            &[1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0],
            &[500.0, 200.0, 100.0, 50.0, 10.0],
        ];
        for counts in samples {
            let gini = gini_coefficient(counts).expect("gini");
            assert!((gini - pairwise_gini(counts)).abs() < 1e-12);
        }
    }

    #[test]
    fn skewed_five_contributor_distribution() {
        let gini = gini_coefficient(&[40.0, 25.0, 20.0, 10.0, 5.0]).expect("gini");
        assert!((gini - 0.34).abs() < 1e-12, "gini was {gini}");
    }

    #[test]
    fn all_zero_input_is_rejected() {
        assert!(matches!(
            gini_coefficient(&[0.0, 0.0, 0.0]),
            Err(GovernanceError::InvalidInput(_))
        ));
    }
}
