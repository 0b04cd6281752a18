use super::validate_counts;
use crate::error::Result;

fn sorted_descending(counts: &[f64]) -> Vec<f64> {
    let mut sorted = counts.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
}

/// Smallest number of top contributors whose combined share reaches half
/// of all contributions.
///
/// The running sum is compared with `>=`, so a prefix landing exactly on
/// 50% stops the count there.
pub fn bus_factor(counts: &[f64]) -> Result<usize> {
    let total = validate_counts(counts)?;
    let sorted = sorted_descending(counts);

    let mut cumulative = 0.0;
    for (index, count) in sorted.iter().enumerate() {
        cumulative += count;
        if 2.0 * cumulative >= total {
            return Ok(index + 1);
        }
    }
    Ok(sorted.len())
}

/// Share of the `k` largest counts in the total, as a percentage.
///
/// `k` is clamped to `[1, n]`.
pub fn top_k_percentage(counts: &[f64], k: usize) -> Result<f64> {
    let total = validate_counts(counts)?;
    let k = k.clamp(1, counts.len());
    let top: f64 = sorted_descending(counts).iter().take(k).sum();
    Ok((top * 100.0 / total).min(100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;

    #[test]
    fn equal_quarters_stop_exactly_at_half() {
        assert_eq!(bus_factor(&[25.0, 25.0, 25.0, 25.0]).expect("bus"), 2);
    }

    #[test]
    fn two_equal_contributors_need_only_one() {
        assert_eq!(bus_factor(&[50.0, 50.0]).expect("bus"), 1);
    }

    #[test]
    fn just_below_half_needs_the_next_contributor() {
        assert_eq!(bus_factor(&[49.0, 26.0, 25.0]).expect("bus"), 2);
        assert_eq!(bus_factor(&[50.0, 25.0, 25.0]).expect("bus"), 1);
    }

    #[test]
    fn skewed_distributions() {
        assert_eq!(bus_factor(&[40.0, 25.0, 20.0, 10.0, 5.0]).expect("bus"), 2);
        assert_eq!(bus_factor(&[95.0, 3.0, 2.0]).expect("bus"), 1);
        assert_eq!(bus_factor(&[5.0, 10.0, 40.0, 20.0, 25.0]).expect("bus"), 2);
        assert_eq!(bus_factor(&[1.0; 10]).expect("bus"), 5);
        assert_eq!(bus_factor(&[1.0; 9]).expect("bus"), 5);
    }

    #[test]
    fn single_contributor_has_bus_factor_one() {
        assert_eq!(bus_factor(&[3.0]).expect("bus"), 1);
    }

    #[test]
    fn top_k_clamps_k_into_range() {
        let counts = [40.0, 25.0, 20.0, 10.0, 5.0];
        assert_eq!(top_k_percentage(&counts, 1).expect("top1"), 40.0);
        assert_eq!(top_k_percentage(&counts, 0).expect("top0"), 40.0);
        assert_eq!(top_k_percentage(&counts, 2).expect("top2"), 65.0);
        assert_eq!(top_k_percentage(&counts, 50).expect("top50"), 100.0);
        assert_eq!(top_k_percentage(&[3.0, 1.0], 5).expect("top5"), 100.0);
    }

    #[test]
    fn input_order_is_not_mutated() {
        let counts = vec![1.0, 3.0, 2.0];
        bus_factor(&counts).expect("bus");
        top_k_percentage(&counts, 2).expect("top2");
        assert_eq!(counts, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(bus_factor(&[]), Err(GovernanceError::InvalidInput(_))));
        assert!(matches!(
            top_k_percentage(&[0.0], 1),
            Err(GovernanceError::InvalidInput(_))
        ));
    }
}
