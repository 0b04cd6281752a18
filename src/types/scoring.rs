use crate::error::{GovernanceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Score = f64;

/// The five Viable System Model subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Operations,
    Coordination,
    Control,
    Intelligence,
    Policy,
}

impl Subsystem {
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Operations,
        Subsystem::Coordination,
        Subsystem::Control,
        Subsystem::Intelligence,
        Subsystem::Policy,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Operations => "operations",
            Self::Coordination => "coordination",
            Self::Control => "control",
            Self::Intelligence => "intelligence",
            Self::Policy => "policy",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sub-scores in `[0, 100]`, one per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VsmSubScores {
    pub operations: Score,
    pub coordination: Score,
    pub control: Score,
    pub intelligence: Score,
    pub policy: Score,
}

impl VsmSubScores {
    pub fn new(
        operations: Score,
        coordination: Score,
        control: Score,
        intelligence: Score,
        policy: Score,
    ) -> Self {
        Self {
            operations,
            coordination,
            control,
            intelligence,
            policy,
        }
    }

    pub fn get(&self, subsystem: Subsystem) -> Score {
        match subsystem {
            Subsystem::Operations => self.operations,
            Subsystem::Coordination => self.coordination,
            Subsystem::Control => self.control,
            Subsystem::Intelligence => self.intelligence,
            Subsystem::Policy => self.policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for subsystem in Subsystem::ALL {
            let score = self.get(subsystem);
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(GovernanceError::InvalidInput(format!(
                    "{subsystem} sub-score must be within 0..=100 (found {score})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsystemStatus {
    Healthy,
    Warning,
    Critical,
}

impl SubsystemStatus {
    pub fn from_score(score: Score) -> Self {
        if score >= 70.0 {
            Self::Healthy
        } else if score >= 40.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn assess(sub_scores: &VsmSubScores, overall: Score) -> Self {
        let critical = Subsystem::ALL
            .iter()
            .filter(|subsystem| {
                SubsystemStatus::from_score(sub_scores.get(**subsystem))
                    == SubsystemStatus::Critical
            })
            .count();
        if critical >= 2 || overall < 30.0 {
            Self::Critical
        } else if critical >= 1 || overall < 50.0 {
            Self::High
        } else if overall < 70.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemReport {
    pub subsystem: Subsystem,
    pub score: Score,
    pub weight: f64,
    pub status: SubsystemStatus,
}

/// Weighted VSM health of one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VsmHealth {
    pub overall: Score,
    pub risk_level: RiskLevel,
    pub subsystems: Vec<SubsystemReport>,
}
