//! Ostrom commons-governance principle scoring from governance artifacts.
//!
//! Which artifact supports which principle is a judgment call, so the
//! mapping lives in an [`OstromTable`] that can be replaced from
//! configuration instead of being spelled out as conditionals.

use crate::error::{GovernanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

pub const MAX_PRINCIPLE_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OstromPrinciple {
    ClearlyDefinedBoundaries,
    Congruence,
    CollectiveChoice,
    Monitoring,
    GraduatedSanctions,
    ConflictResolution,
    RecognitionOfRights,
    NestedEnterprises,
}

impl OstromPrinciple {
    pub const ALL: [OstromPrinciple; 8] = [
        OstromPrinciple::ClearlyDefinedBoundaries,
        OstromPrinciple::Congruence,
        OstromPrinciple::CollectiveChoice,
        OstromPrinciple::Monitoring,
        OstromPrinciple::GraduatedSanctions,
        OstromPrinciple::ConflictResolution,
        OstromPrinciple::RecognitionOfRights,
        OstromPrinciple::NestedEnterprises,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::ClearlyDefinedBoundaries => "Clearly Defined Boundaries",
            Self::Congruence => "Congruence",
            Self::CollectiveChoice => "Collective Choice",
            Self::Monitoring => "Monitoring",
            Self::GraduatedSanctions => "Graduated Sanctions",
            Self::ConflictResolution => "Conflict Resolution",
            Self::RecognitionOfRights => "Recognition of Rights",
            Self::NestedEnterprises => "Nested Enterprises",
        }
    }
}

impl fmt::Display for OstromPrinciple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One artifact → principle contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OstromRule {
    pub artifact: String,
    pub principle: OstromPrinciple,
    pub points: u8,
}

impl OstromRule {
    fn new(artifact: &str, principle: OstromPrinciple, points: u8) -> Self {
        Self {
            artifact: artifact.to_string(),
            principle,
            points,
        }
    }
}

pub type OstromScores = BTreeMap<OstromPrinciple, u8>;

/// Validated artifact → principle lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OstromTable {
    rules: Vec<OstromRule>,
}

impl Default for OstromTable {
    fn default() -> Self {
        use OstromPrinciple::*;
        Self {
            rules: vec![
                OstromRule::new("CONTRIBUTING.md", Congruence, 2),
                OstromRule::new("CONTRIBUTING.md", ClearlyDefinedBoundaries, 2),
                OstromRule::new("CONTRIBUTING.md", CollectiveChoice, 1),
                OstromRule::new("CODE_OF_CONDUCT.md", ConflictResolution, 3),
                OstromRule::new("CODE_OF_CONDUCT.md", GraduatedSanctions, 3),
                OstromRule::new("GOVERNANCE.md", CollectiveChoice, 3),
                OstromRule::new("GOVERNANCE.md", RecognitionOfRights, 3),
                OstromRule::new("GOVERNANCE.md", NestedEnterprises, 2),
                OstromRule::new("GOVERNANCE.md", ConflictResolution, 1),
                OstromRule::new("MAINTAINERS.md", ClearlyDefinedBoundaries, 3),
                OstromRule::new("MAINTAINERS.md", Monitoring, 1),
                OstromRule::new("MAINTAINERS.md", RecognitionOfRights, 1),
                OstromRule::new(".github/CODEOWNERS", Monitoring, 3),
                OstromRule::new(".github/CODEOWNERS", ClearlyDefinedBoundaries, 1),
                OstromRule::new("SECURITY.md", Monitoring, 1),
                OstromRule::new("SECURITY.md", GraduatedSanctions, 1),
                OstromRule::new("SECURITY.md", ConflictResolution, 1),
                OstromRule::new("ROADMAP.md", Congruence, 2),
                OstromRule::new("ROADMAP.md", CollectiveChoice, 1),
                OstromRule::new("CHARTER.md", NestedEnterprises, 3),
                OstromRule::new("CHARTER.md", RecognitionOfRights, 1),
                OstromRule::new("LICENSE", Congruence, 1),
            ],
        }
    }
}

impl OstromTable {
    pub fn new(rules: Vec<OstromRule>) -> Result<Self> {
        let mut pairs = HashSet::new();
        for rule in &rules {
            if rule.artifact.trim().is_empty() {
                return Err(GovernanceError::Configuration(
                    "ostrom rule artifact must be non-empty".to_string(),
                ));
            }
            if rule.points == 0 || rule.points > MAX_PRINCIPLE_SCORE {
                return Err(GovernanceError::Configuration(format!(
                    "ostrom rule {} -> {:?} must award 1..={MAX_PRINCIPLE_SCORE} points (found {})",
                    rule.artifact, rule.principle, rule.points
                )));
            }
            if !pairs.insert((rule.artifact.as_str(), rule.principle)) {
                return Err(GovernanceError::Configuration(format!(
                    "ostrom table maps {} to {:?} more than once",
                    rule.artifact, rule.principle
                )));
            }
        }

        let covered: BTreeSet<OstromPrinciple> = rules.iter().map(|rule| rule.principle).collect();
        let missing = OstromPrinciple::ALL
            .iter()
            .filter(|principle| !covered.contains(*principle))
            .map(|principle| principle.title())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(GovernanceError::Configuration(format!(
                "ostrom table has no entry for principle(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[OstromRule] {
        &self.rules
    }

    pub fn artifacts(&self) -> BTreeSet<&str> {
        self.rules.iter().map(|rule| rule.artifact.as_str()).collect()
    }

    /// Scores every principle from a presence map. Every key in the map must
    /// be known to the table.
    pub fn score(&self, presence: &BTreeMap<String, bool>) -> Result<OstromScores> {
        let known = self.artifacts();
        if let Some(unknown) = presence.keys().find(|key| !known.contains(key.as_str())) {
            return Err(GovernanceError::Configuration(format!(
                "ostrom table has no entry for artifact: {unknown}"
            )));
        }

        let mut scores: OstromScores = OstromPrinciple::ALL
            .iter()
            .map(|principle| (*principle, 0))
            .collect();
        for rule in &self.rules {
            if presence.get(&rule.artifact).copied().unwrap_or(false) {
                let slot = scores.entry(rule.principle).or_insert(0);
                *slot = slot.saturating_add(rule.points).min(MAX_PRINCIPLE_SCORE);
            }
        }
        Ok(scores)
    }
}
