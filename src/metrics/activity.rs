//! Entropy of commit activity across the day and across change sizes.

use super::entropy::{entropy_bits, shannon_entropy};
use crate::error::Result;
use crate::types::project::{CommitActivity, ContributionDistribution};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const HOUR_BINS: usize = 24;

/// Lower edges, in lines touched, of the change-size bins. The last bin is
/// open ended.
pub const CHANGE_SIZE_EDGES: [u64; 5] = [0, 10, 50, 200, 1000];

fn histogram_entropy(bins: &[u64]) -> f64 {
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let counts: Vec<f64> = bins.iter().map(|bin| *bin as f64).collect();
    entropy_bits(&counts, total as f64)
}

/// Entropy in bits of commit times over the 24 UTC hours of the day.
///
/// 0 for no commits. Maximal (log₂ 24) when every hour is equally busy.
pub fn temporal_entropy(timestamps: &[DateTime<Utc>]) -> f64 {
    let mut bins = [0u64; HOUR_BINS];
    for timestamp in timestamps {
        bins[timestamp.hour() as usize] += 1;
    }
    histogram_entropy(&bins)
}

/// Index into [`CHANGE_SIZE_EDGES`] for a change of `lines` lines.
pub fn change_size_bin(lines: u64) -> usize {
    CHANGE_SIZE_EDGES
        .iter()
        .rposition(|edge| lines >= *edge)
        .unwrap_or(0)
}

/// Entropy in bits of per-commit change sizes (additions + deletions).
///
/// 0 when there are no commits or none of them touched a line.
pub fn change_entropy(lines_changed: &[u64]) -> f64 {
    if lines_changed.iter().all(|lines| *lines == 0) {
        return 0.0;
    }
    let mut bins = [0u64; CHANGE_SIZE_EDGES.len()];
    for lines in lines_changed {
        bins[change_size_bin(*lines)] += 1;
    }
    histogram_entropy(&bins)
}

/// Contributor, temporal and change-size entropy of one project. The last
/// two are absent when no commit history was collected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyMeasures {
    pub contributor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

pub fn entropy_measures(
    contributions: &ContributionDistribution,
    commits: &[CommitActivity],
) -> Result<EntropyMeasures> {
    let contributor = shannon_entropy(contributions.counts())?;
    if commits.is_empty() {
        return Ok(EntropyMeasures {
            contributor,
            temporal: None,
            change: None,
        });
    }

    let timestamps: Vec<DateTime<Utc>> = commits.iter().map(|commit| commit.timestamp).collect();
    let sizes: Vec<u64> = commits.iter().map(CommitActivity::lines_changed).collect();
    Ok(EntropyMeasures {
        contributor,
        temporal: Some(temporal_entropy(&timestamps)),
        change: Some(change_entropy(&sizes)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, 15, 0)
            .single()
            .expect("timestamp")
    }

    #[test]
    fn commits_spread_over_every_hour_reach_log2_24() {
        let timestamps: Vec<DateTime<Utc>> = (0..24).flat_map(|h| [at_hour(h), at_hour(h)]).collect();
        let entropy = temporal_entropy(&timestamps);
        assert!((entropy - 24f64.log2()).abs() < 1e-12, "entropy was {entropy}");
    }

    #[test]
    fn commits_in_one_hour_have_zero_temporal_entropy() {
        assert_eq!(temporal_entropy(&[at_hour(9), at_hour(9), at_hour(9)]), 0.0);
        assert_eq!(temporal_entropy(&[]), 0.0);
    }

    #[test]
    fn two_busy_hours_give_one_bit() {
        assert_eq!(temporal_entropy(&[at_hour(3), at_hour(21)]), 1.0);
    }

    #[test]
    fn change_size_bins_follow_edges() {
        assert_eq!(change_size_bin(0), 0);
        assert_eq!(change_size_bin(9), 0);
        assert_eq!(change_size_bin(10), 1);
        assert_eq!(change_size_bin(199), 2);
        assert_eq!(change_size_bin(200), 3);
        assert_eq!(change_size_bin(1000), 4);
        assert_eq!(change_size_bin(u64::MAX), 4);
    }

    #[test]
    fn one_change_per_bin_reaches_log2_5() {
        let entropy = change_entropy(&[3, 20, 120, 600, 5000]);
        assert!((entropy - 5f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn degenerate_change_histories_have_zero_entropy() {
        assert_eq!(change_entropy(&[]), 0.0);
        assert_eq!(change_entropy(&[0, 0, 0]), 0.0);
        assert_eq!(change_entropy(&[12, 30, 49]), 0.0);
    }

    #[test]
    fn measures_without_commits_only_carry_contributor_entropy() {
        let distribution = ContributionDistribution::from_counts(&[5, 5]).expect("distribution");
        let measures = entropy_measures(&distribution, &[]).expect("measures");
        assert_eq!(measures.contributor, 1.0);
        assert_eq!(measures.temporal, None);
        assert_eq!(measures.change, None);
    }

    #[test]
    fn measures_with_commits() {
        let distribution = ContributionDistribution::from_counts(&[5, 5]).expect("distribution");
        let commits = [
            CommitActivity {
                timestamp: at_hour(8),
                additions: 4,
                deletions: 1,
            },
            CommitActivity {
                timestamp: at_hour(20),
                additions: 300,
                deletions: 50,
            },
        ];
        let measures = entropy_measures(&distribution, &commits).expect("measures");
        assert_eq!(measures.temporal, Some(1.0));
        assert_eq!(measures.change, Some(1.0));
    }
}
