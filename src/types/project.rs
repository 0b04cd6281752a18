use crate::error::{GovernanceError, Result};
use crate::vsm::indicators::VsmIndicators;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Governance archetype of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryLabel {
    Federation,
    Stadium,
    Club,
    Toy,
}

impl CategoryLabel {
    pub const ALL: [CategoryLabel; 4] = [
        CategoryLabel::Federation,
        CategoryLabel::Stadium,
        CategoryLabel::Club,
        CategoryLabel::Toy,
    ];

    /// Archetypes ordered from most concentrated to most distributed
    /// contributor activity.
    pub const GRADIENT: [CategoryLabel; 4] = [
        CategoryLabel::Toy,
        CategoryLabel::Club,
        CategoryLabel::Stadium,
        CategoryLabel::Federation,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Federation => 0,
            Self::Stadium => 1,
            Self::Club => 2,
            Self::Toy => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn gradient_rank(self) -> usize {
        match self {
            Self::Toy => 0,
            Self::Club => 1,
            Self::Stadium => 2,
            Self::Federation => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Federation => "federation",
            Self::Stadium => "stadium",
            Self::Club => "club",
            Self::Toy => "toy",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryLabel {
    type Err = GovernanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "federation" => Ok(Self::Federation),
            "stadium" => Ok(Self::Stadium),
            "club" => Ok(Self::Club),
            "toy" => Ok(Self::Toy),
            other => Err(GovernanceError::InvalidInput(format!(
                "unknown category label: {other}"
            ))),
        }
    }
}

/// Per-contributor contribution counts with zero entries removed.
///
/// Construction rejects negative and non-finite counts, and an input that
/// is empty once zeros are dropped. The stored order is the input order;
/// sorted views are always returned as new vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ContributionDistribution {
    counts: Vec<f64>,
}

impl ContributionDistribution {
    pub fn new(counts: Vec<f64>) -> Result<Self> {
        if let Some(bad) = counts.iter().find(|count| !count.is_finite() || **count < 0.0) {
            return Err(GovernanceError::InvalidInput(format!(
                "contribution counts must be finite and non-negative (found {bad})"
            )));
        }
        let counts: Vec<f64> = counts.into_iter().filter(|count| *count > 0.0).collect();
        if counts.is_empty() {
            return Err(GovernanceError::InvalidInput(
                "contribution distribution has no positive counts".to_string(),
            ));
        }
        Ok(Self { counts })
    }

    pub fn from_counts(counts: &[u64]) -> Result<Self> {
        Self::new(counts.iter().map(|count| *count as f64).collect())
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn contributors(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn sorted_descending(&self) -> Vec<f64> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        sorted
    }
}

impl TryFrom<Vec<f64>> for ContributionDistribution {
    type Error = GovernanceError;

    fn try_from(counts: Vec<f64>) -> Result<Self> {
        Self::new(counts)
    }
}

impl From<ContributionDistribution> for Vec<f64> {
    fn from(distribution: ContributionDistribution) -> Self {
        distribution.counts
    }
}

/// One commit from a project's history, reduced to what activity entropy
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitActivity {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

impl CommitActivity {
    pub fn lines_changed(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }
}

/// Wire shape of a project snapshot as handed over by a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectRecord {
    id: String,
    contributions: ContributionDistribution,
    #[serde(default)]
    governance_files: BTreeMap<String, bool>,
    category: Option<CategoryLabel>,
    collected_at: DateTime<Utc>,
    vsm: Option<VsmIndicators>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    commits: Vec<CommitActivity>,
}

/// Immutable measurement snapshot of one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProjectRecord", into = "ProjectRecord")]
pub struct GovernanceProject {
    id: String,
    contributions: ContributionDistribution,
    governance_files: BTreeMap<String, bool>,
    category: Option<CategoryLabel>,
    collected_at: DateTime<Utc>,
    vsm: Option<VsmIndicators>,
    commits: Vec<CommitActivity>,
}

impl GovernanceProject {
    pub fn new(
        id: impl Into<String>,
        contributions: ContributionDistribution,
        governance_files: BTreeMap<String, bool>,
        category: Option<CategoryLabel>,
        collected_at: DateTime<Utc>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GovernanceError::InvalidInput(
                "project id must be non-empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            contributions,
            governance_files,
            category,
            collected_at,
            vsm: None,
            commits: Vec::new(),
        })
    }

    /// Returns a new snapshot carrying raw VSM indicators.
    pub fn with_vsm_indicators(self, vsm: VsmIndicators) -> Self {
        Self {
            vsm: Some(vsm),
            ..self
        }
    }

    /// Returns a new snapshot carrying commit history.
    pub fn with_commits(self, commits: Vec<CommitActivity>) -> Self {
        Self { commits, ..self }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contributions(&self) -> &ContributionDistribution {
        &self.contributions
    }

    pub fn governance_files(&self) -> &BTreeMap<String, bool> {
        &self.governance_files
    }

    pub fn category(&self) -> Option<CategoryLabel> {
        self.category
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn vsm_indicators(&self) -> Option<&VsmIndicators> {
        self.vsm.as_ref()
    }

    pub fn commits(&self) -> &[CommitActivity] {
        &self.commits
    }
}

impl TryFrom<ProjectRecord> for GovernanceProject {
    type Error = GovernanceError;

    fn try_from(record: ProjectRecord) -> Result<Self> {
        let project = Self::new(
            record.id,
            record.contributions,
            record.governance_files,
            record.category,
            record.collected_at,
        )?;
        let project = project.with_commits(record.commits);
        Ok(match record.vsm {
            Some(vsm) => project.with_vsm_indicators(vsm),
            None => project,
        })
    }
}

impl From<GovernanceProject> for ProjectRecord {
    fn from(project: GovernanceProject) -> Self {
        Self {
            id: project.id,
            contributions: project.contributions,
            governance_files: project.governance_files,
            category: project.category,
            collected_at: project.collected_at,
            vsm: project.vsm,
            commits: project.commits,
        }
    }
}
