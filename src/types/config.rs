use crate::classify::TrainingParams;
use crate::error::{GovernanceError, Result};
use crate::ostrom::{OstromRule, OstromTable};
use crate::vsm::VsmWeights;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_FOLDS: usize = 5;

/// Merged contents of the `govmetrics.toml` layers. Every section is
/// optional; missing sections fall back to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GovConfig {
    pub vsm: Option<VsmConfig>,
    pub ostrom: Option<OstromConfig>,
    pub classifier: Option<ClassifierConfig>,
    pub batch: Option<BatchConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VsmConfig {
    pub weights: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OstromConfig {
    /// Replaces the built-in artifact table entirely when present.
    pub rules: Option<Vec<OstromRule>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub learning_rate: Option<f64>,
    pub epochs: Option<u32>,
    pub l2_penalty: Option<f64>,
    pub folds: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub threads: Option<usize>,
}

impl GovConfig {
    pub fn vsm_weights(&self) -> Result<VsmWeights> {
        match self.vsm.as_ref().and_then(|vsm| vsm.weights.as_ref()) {
            Some(weights) => VsmWeights::from_map(weights),
            None => Ok(VsmWeights::default()),
        }
    }

    pub fn ostrom_table(&self) -> Result<OstromTable> {
        match self.ostrom.as_ref().and_then(|ostrom| ostrom.rules.as_ref()) {
            Some(rules) => OstromTable::new(rules.clone()),
            None => Ok(OstromTable::default()),
        }
    }

    pub fn training_params(&self) -> TrainingParams {
        let defaults = TrainingParams::default();
        match &self.classifier {
            Some(classifier) => TrainingParams {
                learning_rate: classifier.learning_rate.unwrap_or(defaults.learning_rate),
                epochs: classifier.epochs.unwrap_or(defaults.epochs),
                l2_penalty: classifier.l2_penalty.unwrap_or(defaults.l2_penalty),
            },
            None => defaults,
        }
    }

    pub fn folds(&self) -> usize {
        self.classifier
            .as_ref()
            .and_then(|classifier| classifier.folds)
            .unwrap_or(DEFAULT_FOLDS)
    }

    /// Rayon pool size; `None` (or 0 in the file) keeps rayon's default.
    pub fn threads(&self) -> Option<usize> {
        self.batch
            .as_ref()
            .and_then(|batch| batch.threads)
            .filter(|threads| *threads > 0)
    }

    pub fn validate(&self) -> Result<()> {
        self.vsm_weights()?;
        self.ostrom_table()?;
        self.training_params().validate()?;

        if self.folds() < 2 {
            return Err(GovernanceError::Configuration(format!(
                "classifier.folds must be at least 2 (found {})",
                self.folds()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ostrom::OstromPrinciple;
    use crate::types::scoring::Subsystem;

    fn parse(toml_str: &str) -> GovConfig {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("");
        assert_eq!(
            cfg.vsm_weights().expect("weights"),
            VsmWeights::default()
        );
        assert_eq!(cfg.ostrom_table().expect("table"), OstromTable::default());
        assert_eq!(cfg.training_params(), TrainingParams::default());
        assert_eq!(cfg.folds(), DEFAULT_FOLDS);
        assert_eq!(cfg.threads(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let cfg = parse(
            r#"
[vsm.weights]
operations = 0.30
coordination = 0.20
control = 0.20
intelligence = 0.10
policy = 0.20

[classifier]
learning_rate = 0.1
epochs = 500
folds = 4

[batch]
threads = 2
"#,
        );
        let weights = cfg.vsm_weights().expect("weights");
        assert_eq!(weights.get(Subsystem::Operations), 0.30);
        assert_eq!(weights.get(Subsystem::Intelligence), 0.10);
        let params = cfg.training_params();
        assert_eq!(params.learning_rate, 0.1);
        assert_eq!(params.epochs, 500);
        assert_eq!(params.l2_penalty, TrainingParams::default().l2_penalty);
        assert_eq!(cfg.folds(), 4);
        assert_eq!(cfg.threads(), Some(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_weight_sum() {
        let cfg = parse(
            r#"
[vsm.weights]
operations = 0.9
"#,
        );
        let err = cfg.validate().expect_err("weights should not sum to one");
        assert!(matches!(err, GovernanceError::Configuration(_)));
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn validate_rejects_unknown_weight_keys() {
        let cfg = parse(
            r#"
[vsm.weights]
operations = 0.25
coordination = 0.20
control = 0.20
intelligence = 0.15
policy = 0.20
identity = 0.0
"#,
        );
        let err = cfg.validate().expect_err("unknown key should fail");
        assert!(err.to_string().contains("unknown key(s): identity"));
    }

    #[test]
    fn ostrom_rules_replace_the_default_table() {
        let mut rules = String::new();
        for principle in [
            "clearly_defined_boundaries",
            "congruence",
            "collective_choice",
            "monitoring",
            "graduated_sanctions",
            "conflict_resolution",
            "recognition_of_rights",
            "nested_enterprises",
        ] {
            rules.push_str(&format!(
                "[[ostrom.rules]]\nartifact = \"GOVERNANCE.md\"\nprinciple = \"{principle}\"\npoints = 5\n\n"
            ));
        }
        let cfg = parse(&rules);
        let table = cfg.ostrom_table().expect("table");
        assert_eq!(table.rules().len(), 8);
        assert_eq!(table.rules()[3].principle, OstromPrinciple::Monitoring);
    }

    #[test]
    fn validate_rejects_incomplete_ostrom_table() {
        let cfg = parse(
            r#"
[[ostrom.rules]]
artifact = "GOVERNANCE.md"
principle = "monitoring"
points = 3
"#,
        );
        assert!(matches!(
            cfg.validate(),
            Err(GovernanceError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_classifier_values() {
        assert!(parse("[classifier]\nfolds = 1\n").validate().is_err());
        assert!(parse("[classifier]\nepochs = 0\n").validate().is_err());
        assert!(parse("[classifier]\nlearning_rate = -0.5\n").validate().is_err());
    }

    #[test]
    fn zero_threads_means_rayon_default() {
        assert_eq!(parse("[batch]\nthreads = 0\n").threads(), None);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let result: std::result::Result<GovConfig, _> = toml::from_str("[project]\nname = \"x\"\n");
        assert!(result.is_err());
    }
}
