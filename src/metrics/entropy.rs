use super::validate_counts;
use crate::error::Result;

/// Shannon entropy in bits of a contribution vector.
///
/// H = -Σ pᵢ log₂(pᵢ), with pᵢ = cᵢ / Σc. Zero counts contribute nothing.
pub fn shannon_entropy(counts: &[f64]) -> Result<f64> {
    let total = validate_counts(counts)?;
    if counts.len() == 1 {
        return Ok(0.0);
    }

    Ok(entropy_bits(counts, total))
}

/// -Σ pᵢ log₂(pᵢ) over the positive entries; `total` must be their finite,
/// positive sum.
pub(crate) fn entropy_bits(counts: &[f64], total: f64) -> f64 {
    let entropy = counts
        .iter()
        .filter(|count| **count > 0.0)
        .map(|count| {
            let p = count / total;
            -p * p.log2()
        })
        .sum::<f64>();

    // A single non-zero share sums to -0.0.
    entropy.max(0.0)
}

/// Entropy divided by log₂(n), n being the number of entries.
///
/// Defined as 0 for a single entry, where log₂(1) = 0.
pub fn normalized_entropy(counts: &[f64]) -> Result<f64> {
    let entropy = shannon_entropy(counts)?;
    if counts.len() <= 1 {
        return Ok(0.0);
    }
    let max_entropy = (counts.len() as f64).log2();
    Ok((entropy / max_entropy).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;

    #[test]
    fn uniform_distribution_reaches_log2_n() {
        let entropy = shannon_entropy(&[25.0, 25.0, 25.0, 25.0]).expect("entropy");
        assert_eq!(entropy, 2.0);
        assert_eq!(
            normalized_entropy(&[25.0, 25.0, 25.0, 25.0]).expect("normalized"),
            1.0
        );

        let seven = [3.0; 7];
        let entropy = shannon_entropy(&seven).expect("entropy");
        assert!((entropy - 7f64.log2()).abs() < 1e-12);
        assert!((normalized_entropy(&seven).expect("normalized") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_contributor_has_zero_entropy() {
        assert_eq!(shannon_entropy(&[42.0]).expect("entropy"), 0.0);
        assert_eq!(normalized_entropy(&[42.0]).expect("normalized"), 0.0);
    }

    #[test]
    fn zero_entries_contribute_nothing() {
        assert_eq!(shannon_entropy(&[0.0, 0.0, 9.0, 0.0]).expect("entropy"), 0.0);
        assert_eq!(
            normalized_entropy(&[0.0, 0.0, 9.0, 0.0]).expect("normalized"),
            0.0
        );
    }

    #[test]
    fn skewed_five_contributor_distribution() {
        let counts = [40.0, 25.0, 20.0, 10.0, 5.0];
        let entropy = shannon_entropy(&counts).expect("entropy");
        assert!((entropy - 2.041_446).abs() < 1e-5, "entropy was {entropy}");
        let normalized = normalized_entropy(&counts).expect("normalized");
        assert!((normalized - 0.879_203).abs() < 1e-5, "normalized was {normalized}");
    }

    #[test]
    fn dominant_contributor_has_low_normalized_entropy() {
        let normalized = normalized_entropy(&[95.0, 3.0, 2.0]).expect("normalized");
        assert!(normalized < 0.3);
        assert!((normalized - 0.211_326).abs() < 1e-5);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            shannon_entropy(&[]),
            Err(GovernanceError::InvalidInput(_))
        ));
        assert!(matches!(
            shannon_entropy(&[1.0, -2.0]),
            Err(GovernanceError::InvalidInput(_))
        ));
        assert!(matches!(
            normalized_entropy(&[0.0, 0.0]),
            Err(GovernanceError::InvalidInput(_))
        ));
    }
}
