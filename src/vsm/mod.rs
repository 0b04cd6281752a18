//! Viable System Model health scoring.

pub mod indicators;

use crate::error::{GovernanceError, Result};
use crate::types::scoring::{
    RiskLevel, Score, Subsystem, SubsystemReport, SubsystemStatus, VsmHealth, VsmSubScores,
};
use serde::Serialize;
use std::collections::HashMap;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Static subsystem weights. Always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VsmWeights {
    operations: f64,
    coordination: f64,
    control: f64,
    intelligence: f64,
    policy: f64,
}

impl Default for VsmWeights {
    fn default() -> Self {
        Self {
            operations: 0.25,
            coordination: 0.20,
            control: 0.20,
            intelligence: 0.15,
            policy: 0.20,
        }
    }
}

impl VsmWeights {
    pub fn new(
        operations: f64,
        coordination: f64,
        control: f64,
        intelligence: f64,
        policy: f64,
    ) -> Result<Self> {
        let weights = Self {
            operations,
            coordination,
            control,
            intelligence,
            policy,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Builds weights from a keyed map, falling back to the defaults for
    /// missing subsystems.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self> {
        let unknown = map
            .keys()
            .filter(|key| !Subsystem::ALL.iter().any(|s| s.key() == key.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(GovernanceError::Configuration(format!(
                "vsm.weights contains unknown key(s): {}",
                unknown.join(", ")
            )));
        }

        let defaults = Self::default();
        let pick = |subsystem: Subsystem| {
            map.get(subsystem.key())
                .copied()
                .unwrap_or_else(|| defaults.get(subsystem))
        };
        Self::new(
            pick(Subsystem::Operations),
            pick(Subsystem::Coordination),
            pick(Subsystem::Control),
            pick(Subsystem::Intelligence),
            pick(Subsystem::Policy),
        )
    }

    pub fn get(&self, subsystem: Subsystem) -> f64 {
        match subsystem {
            Subsystem::Operations => self.operations,
            Subsystem::Coordination => self.coordination,
            Subsystem::Control => self.control,
            Subsystem::Intelligence => self.intelligence,
            Subsystem::Policy => self.policy,
        }
    }

    fn validate(&self) -> Result<()> {
        for subsystem in Subsystem::ALL {
            let weight = self.get(subsystem);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(GovernanceError::Configuration(format!(
                    "vsm weight for {subsystem} must be between 0.0 and 1.0 (found {weight})"
                )));
            }
        }
        let sum: f64 = Subsystem::ALL.iter().map(|s| self.get(*s)).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GovernanceError::Configuration(format!(
                "vsm weights must sum to 1.0 (found {sum:.6})"
            )));
        }
        Ok(())
    }
}

/// Combines the five sub-scores into one 0-100 health score.
#[derive(Debug, Clone, Default)]
pub struct VsmScorer {
    weights: VsmWeights,
}

impl VsmScorer {
    pub fn new(weights: VsmWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &VsmWeights {
        &self.weights
    }

    pub fn overall(&self, sub_scores: &VsmSubScores) -> Result<Score> {
        sub_scores.validate()?;
        let overall = Subsystem::ALL
            .iter()
            .map(|subsystem| sub_scores.get(*subsystem) * self.weights.get(*subsystem))
            .sum::<f64>();
        Ok(overall.clamp(0.0, 100.0))
    }

    pub fn score(&self, sub_scores: &VsmSubScores) -> Result<VsmHealth> {
        let overall = self.overall(sub_scores)?;
        let subsystems = Subsystem::ALL
            .iter()
            .map(|subsystem| {
                let score = sub_scores.get(*subsystem);
                SubsystemReport {
                    subsystem: *subsystem,
                    score,
                    weight: self.weights.get(*subsystem),
                    status: SubsystemStatus::from_score(score),
                }
            })
            .collect();

        Ok(VsmHealth {
            overall,
            risk_level: RiskLevel::assess(sub_scores, overall),
            subsystems,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_score_reference_example() {
        let scorer = VsmScorer::default();
        let overall = scorer
            .overall(&VsmSubScores::new(80.0, 70.0, 60.0, 90.0, 50.0))
            .expect("overall");
        assert!((overall - 69.5).abs() < 1e-9, "overall was {overall}");
    }

    #[test]
    fn score_reports_status_and_risk() {
        let health = VsmScorer::default()
            .score(&VsmSubScores::new(80.0, 70.0, 60.0, 90.0, 50.0))
            .expect("health");
        assert_eq!(health.subsystems.len(), 5);
        assert_eq!(health.subsystems[0].status, SubsystemStatus::Healthy);
        assert_eq!(health.subsystems[4].status, SubsystemStatus::Warning);
        assert_eq!(health.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = VsmWeights::new(0.3, 0.3, 0.3, 0.3, 0.3).expect_err("should fail");
        assert!(matches!(err, GovernanceError::Configuration(_)));
        assert!(err.to_string().contains("sum to 1.0"));
        assert!(VsmWeights::new(0.2, 0.2, 0.2, 0.2, 0.2).is_ok());
    }

    #[test]
    fn weights_reject_negative_entries() {
        assert!(VsmWeights::new(-0.1, 0.3, 0.3, 0.3, 0.2).is_err());
    }

    #[test]
    fn from_map_merges_defaults_and_rejects_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("operations".to_string(), 0.30);
        map.insert("intelligence".to_string(), 0.10);
        let weights = VsmWeights::from_map(&map).expect("weights");
        assert_eq!(weights.get(Subsystem::Operations), 0.30);
        assert_eq!(weights.get(Subsystem::Policy), 0.20);

        map.insert("finance".to_string(), 0.0);
        let err = VsmWeights::from_map(&map).expect_err("unknown key");
        assert!(err.to_string().contains("finance"));
    }

    #[test]
    fn out_of_range_sub_scores_are_invalid_input() {
        let err = VsmScorer::default()
            .overall(&VsmSubScores::new(120.0, 0.0, 0.0, 0.0, 0.0))
            .expect_err("should fail");
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
    }
}
