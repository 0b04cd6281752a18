use crate::error::{GovernanceError, Result};
use crate::metrics::bus_factor;
use crate::types::project::ContributionDistribution;
use crate::types::scoring::VsmSubScores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FOUNDATION_OWNERS: [&str; 6] = ["apache", "linux", "cncf", "eclipse", "python", "rust-lang"];
const ACTIVE_MAINTAINER_MIN_CONTRIBUTIONS: f64 = 10.0;

/// Raw activity indicators a collector gathers for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VsmIndicators {
    #[serde(default)]
    pub recent_commits: u32,
    #[serde(default)]
    pub pull_requests: u32,
    #[serde(default)]
    pub reviewed_pull_requests: u32,
    #[serde(default)]
    pub open_issues: u32,
    #[serde(default)]
    pub has_discussions: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_license: bool,
    #[serde(default)]
    pub has_description: bool,
    #[serde(default)]
    pub owner: String,
}

impl VsmIndicators {
    pub fn review_rate(&self) -> Result<f64> {
        if self.reviewed_pull_requests > self.pull_requests {
            return Err(GovernanceError::InvalidInput(format!(
                "reviewed pull requests ({}) exceed pull requests ({})",
                self.reviewed_pull_requests, self.pull_requests
            )));
        }
        if self.pull_requests == 0 {
            return Ok(0.0);
        }
        Ok(f64::from(self.reviewed_pull_requests) / f64::from(self.pull_requests))
    }

    pub fn is_foundation_owned(&self) -> bool {
        let owner = self.owner.to_lowercase();
        FOUNDATION_OWNERS.iter().any(|marker| owner.contains(marker))
    }
}

fn has_file(files: &BTreeMap<String, bool>, name: &str) -> bool {
    files.get(name).copied().unwrap_or(false)
}

fn points(present: bool, value: f64) -> f64 {
    if present {
        value
    } else {
        0.0
    }
}

/// Derives the five VSM sub-scores from raw indicators, governance-file
/// presence and the contributor distribution.
pub fn derive_sub_scores(
    indicators: &VsmIndicators,
    governance_files: &BTreeMap<String, bool>,
    contributions: &ContributionDistribution,
) -> Result<VsmSubScores> {
    let contributors = contributions.contributors() as f64;
    let bus = bus_factor(contributions.counts())? as f64;

    let operations = (contributors * 0.5).min(30.0)
        + (f64::from(indicators.recent_commits) * 0.5).min(25.0)
        + (f64::from(indicators.pull_requests) * 0.5).min(25.0)
        + (bus * 5.0).min(20.0);

    let coordination = points(has_file(governance_files, ".github/CODEOWNERS"), 30.0)
        + indicators.review_rate()? * 40.0
        + points(indicators.pull_requests > 0, 30.0);

    let active_maintainers = contributions
        .sorted_descending()
        .iter()
        .take(10)
        .filter(|count| **count > ACTIVE_MAINTAINER_MIN_CONTRIBUTIONS)
        .count()
        .min(5) as f64;
    let control = points(has_file(governance_files, "CONTRIBUTING.md"), 25.0)
        + points(has_file(governance_files, "MAINTAINERS.md"), 25.0)
        + (active_maintainers * 12.5).min(50.0);

    let intelligence = points(indicators.has_discussions, 30.0)
        + points(has_file(governance_files, "ROADMAP.md"), 30.0)
        + points(indicators.has_wiki, 20.0)
        + points(indicators.open_issues > 0, 20.0);

    let policy = points(has_file(governance_files, "GOVERNANCE.md"), 30.0)
        + points(has_file(governance_files, "CODE_OF_CONDUCT.md"), 20.0)
        + points(indicators.has_license, 20.0)
        + points(indicators.has_description, 10.0)
        + points(indicators.is_foundation_owned(), 20.0);

    Ok(VsmSubScores::new(
        operations.min(100.0),
        coordination.min(100.0),
        control.min(100.0),
        intelligence.min(100.0),
        policy.min(100.0),
    ))
}
