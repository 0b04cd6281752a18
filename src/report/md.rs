use crate::metrics::MetricsRecord;
use crate::ostrom::OstromPrinciple;
use crate::stats::CategoryComparison;
use crate::types::project::CategoryLabel;
use crate::types::report::{BatchReport, ProjectReport, TrainingReport};

pub trait ToMarkdown {
    fn to_markdown(&self) -> String;
}

fn push_metrics(output: &mut String, record: &MetricsRecord) {
    output.push_str(&format!(
        "- contributors: {}\n- total contributions: {}\n- entropy: {:.4}\n- normalized entropy: {:.4}\n- gini: {:.4}\n- bus factor: {}\n- top-1 share: {:.2}%\n- top-5 share: {:.2}%\n",
        record.contributors,
        record.total_contributions,
        record.entropy,
        record.normalized_entropy,
        record.gini,
        record.bus_factor,
        record.top1_percentage,
        record.top5_percentage
    ));
}

impl ToMarkdown for MetricsRecord {
    fn to_markdown(&self) -> String {
        let mut output = String::from("# Contribution Metrics\n\n");
        push_metrics(&mut output, self);
        output
    }
}

fn push_project(output: &mut String, project: &ProjectReport) {
    output.push_str(&format!("### {}\n\n", project.id));
    output.push_str(&format!(
        "Collected: {}\n\n",
        project.collected_at.format("%Y-%m-%d")
    ));
    push_metrics(output, &project.metrics);
    if let (Some(temporal), Some(change)) = (project.entropy.temporal, project.entropy.change) {
        output.push_str(&format!(
            "- temporal entropy: {temporal:.4}\n- change-size entropy: {change:.4}\n"
        ));
    }

    output.push_str(&format!(
        "- prediction: {} ({:?}, confidence {:.2})",
        project.prediction.label, project.prediction_source, project.prediction.confidence
    ));
    if let Some(label) = project.category {
        output.push_str(&format!(", labeled {label}"));
    }
    output.push('\n');

    if let Some(vsm) = &project.vsm {
        output.push_str(&format!(
            "- VSM health: {:.1} (risk {:?})\n",
            vsm.overall, vsm.risk_level
        ));
        for subsystem in &vsm.subsystems {
            output.push_str(&format!(
                "  - {}: {:.1} ({:?})\n",
                subsystem.subsystem, subsystem.score, subsystem.status
            ));
        }
    }

    output.push_str(&format!("- Ostrom total: {}/40\n", project.ostrom_total()));
    let missing: Vec<&str> = OstromPrinciple::ALL
        .iter()
        .filter(|principle| project.ostrom.get(*principle).copied().unwrap_or(0) == 0)
        .map(|principle| principle.title())
        .collect();
    if !missing.is_empty() {
        output.push_str(&format!("  - unsupported: {}\n", missing.join(", ")));
    }
    output.push('\n');
}

impl ToMarkdown for BatchReport {
    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Governance Report\n\n");
        output.push_str(&format!(
            "Generated: {}\n\nAnalyzed: {}, failed: {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.projects.len(),
            self.failures.len()
        ));
        if let Some(agreement) = self.label_agreement() {
            output.push_str(&format!(
                "Label agreement: {:.1}%\n\n",
                agreement * 100.0
            ));
        }

        output.push_str("## Projects\n\n");
        if self.projects.is_empty() {
            output.push_str("- none\n\n");
        }
        for project in &self.projects {
            push_project(&mut output, project);
        }

        output.push_str("## Failures\n\n");
        if self.failures.is_empty() {
            output.push_str("- none\n");
        } else {
            for failure in &self.failures {
                output.push_str(&format!(
                    "- {} [{}]: {}\n",
                    failure.id, failure.kind, failure.message
                ));
            }
        }
        output
    }
}

impl ToMarkdown for TrainingReport {
    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Classifier Training\n\n");
        output.push_str(&format!(
            "Examples: {} | learning rate {} | epochs {} | L2 {}\n\n",
            self.examples, self.params.learning_rate, self.params.epochs, self.params.l2_penalty
        ));
        for (label, count) in &self.class_counts {
            output.push_str(&format!("- {label}: {count}\n"));
        }
        output.push_str(&format!(
            "\nTraining accuracy: {:.1}%\n\n",
            self.training_accuracy * 100.0
        ));

        output.push_str("## Feature Importance\n\n");
        for (name, share) in &self.feature_importance {
            output.push_str(&format!("- {name}: {share:.3}\n"));
        }

        if let Some(cv) = &self.cross_validation {
            output.push_str(&format!(
                "\n## Cross-Validation ({} folds)\n\nAccuracy: {:.1}%\n\n",
                cv.folds,
                cv.accuracy * 100.0
            ));
            output.push_str("| actual \\ predicted |");
            for label in CategoryLabel::ALL {
                output.push_str(&format!(" {label} |"));
            }
            output.push_str("\n|---|---|---|---|---|\n");
            for actual in CategoryLabel::ALL {
                output.push_str(&format!("| {actual} |"));
                for count in cv.confusion[actual.index()] {
                    output.push_str(&format!(" {count} |"));
                }
                output.push('\n');
            }
        }

        if let Some(path) = &self.model_path {
            output.push_str(&format!("\nModel written to {path}\n"));
        }
        output
    }
}

impl ToMarkdown for CategoryComparison {
    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# Archetype Comparison: {}\n\n", self.metric));
        for label in CategoryLabel::GRADIENT {
            if let (Some(size), Some(median)) =
                (self.group_sizes.get(&label), self.medians.get(&label))
            {
                output.push_str(&format!("- {label}: n = {size}, median {median:.4}\n"));
            }
        }
        output.push_str(&format!(
            "\nKruskal-Wallis H = {:.4}, p = {:.4}\n\n",
            self.kruskal_wallis.statistic, self.kruskal_wallis.p_value
        ));

        output.push_str("## Adjacent Pairs\n\n");
        for pair in &self.adjacent_pairs {
            let effect = pair
                .cohens_d
                .map(|d| format!("{d:.3}"))
                .unwrap_or_else(|| "undefined".to_string());
            output.push_str(&format!(
                "- {} vs {}: U = {:.1}, p = {:.4}, d = {}\n",
                pair.upper,
                pair.lower,
                pair.mann_whitney.statistic,
                pair.mann_whitney.p_value,
                effect
            ));
        }

        match &self.gradient_correlation {
            Some(correlation) => output.push_str(&format!(
                "\nSpearman rho with gradient rank: {:.4} (p = {:.4})\n",
                correlation.statistic, correlation.p_value
            )),
            None => output.push_str("\nSpearman rho with gradient rank: undefined\n"),
        }
        output
    }
}
