//! Dataset loading and parallel per-project analysis.

use crate::classify::{classify_heuristic, Features, LabeledExample, LogisticModel};
use crate::error::{GovernanceError, Result};
use crate::metrics::{entropy_measures, MetricsRecord};
use crate::ostrom::OstromTable;
use crate::types::project::{CategoryLabel, GovernanceProject};
use crate::types::report::{BatchReport, PredictionSource, ProjectFailure, ProjectReport};
use crate::vsm::indicators::derive_sub_scores;
use crate::vsm::VsmScorer;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Projects read from a dataset file, plus the entries that could not be
/// turned into a project.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub projects: Vec<GovernanceProject>,
    pub rejected: Vec<ProjectFailure>,
}

/// Reads a JSON array of projects. Project ids must be unique.
///
/// An entry with bad contents is recorded in [`Dataset::rejected`] under its
/// id (or `#<index>` when it has none) instead of failing the whole file.
pub fn load_projects(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&content)?;

    let mut seen = HashSet::new();
    let mut dataset = Dataset::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let id = match entry.get("id").and_then(serde_json::Value::as_str) {
            Some(id) => id.to_string(),
            None => format!("#{index}"),
        };
        if !seen.insert(id.clone()) {
            return Err(GovernanceError::InvalidInput(format!(
                "duplicate project id '{id}' in {}",
                path.display()
            )));
        }

        match serde_json::from_value::<GovernanceProject>(entry) {
            Ok(project) => dataset.projects.push(project),
            Err(e) => {
                let err = GovernanceError::InvalidInput(format!("project '{id}': {e}"));
                warn!(project = %id, kind = err.kind(), "skipping project: {err}");
                dataset.rejected.push(ProjectFailure {
                    id,
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
    debug!(
        count = dataset.projects.len(),
        rejected = dataset.rejected.len(),
        path = %path.display(),
        "loaded projects"
    );
    Ok(dataset)
}

/// Metrics for every project that carries a category label.
pub fn labeled_metrics(
    projects: &[GovernanceProject],
) -> Result<Vec<(CategoryLabel, MetricsRecord)>> {
    projects
        .iter()
        .filter_map(|project| project.category().map(|label| (label, project)))
        .map(|(label, project)| Ok((label, MetricsRecord::compute(project.contributions())?)))
        .collect()
}

pub fn labeled_examples(projects: &[GovernanceProject]) -> Result<Vec<LabeledExample>> {
    Ok(labeled_metrics(projects)?
        .iter()
        .map(|(label, record)| LabeledExample::new(Features::from_metrics(record), *label))
        .collect())
}

/// Runs metrics, VSM, Ostrom and classification over many projects.
#[derive(Debug, Clone, Default)]
pub struct BatchAnalyzer {
    scorer: VsmScorer,
    ostrom: OstromTable,
    model: Option<LogisticModel>,
    threads: Option<usize>,
}

impl BatchAnalyzer {
    pub fn new(scorer: VsmScorer, ostrom: OstromTable) -> Self {
        Self {
            scorer,
            ostrom,
            model: None,
            threads: None,
        }
    }

    /// Uses a trained model instead of the threshold heuristic.
    pub fn with_model(mut self, model: LogisticModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn analyze_project(&self, project: &GovernanceProject) -> Result<ProjectReport> {
        let metrics = MetricsRecord::compute(project.contributions())?;
        let entropy = entropy_measures(project.contributions(), project.commits())?;

        let vsm = match project.vsm_indicators() {
            Some(indicators) => {
                let sub_scores = derive_sub_scores(
                    indicators,
                    project.governance_files(),
                    project.contributions(),
                )?;
                Some(self.scorer.score(&sub_scores)?)
            }
            None => None,
        };

        let ostrom = self.ostrom.score(project.governance_files())?;

        let (prediction, prediction_source) = match &self.model {
            Some(model) => (
                model.classify(&Features::from_metrics(&metrics))?,
                PredictionSource::Model,
            ),
            None => (classify_heuristic(&metrics), PredictionSource::Heuristic),
        };

        Ok(ProjectReport {
            id: project.id().to_string(),
            collected_at: project.collected_at(),
            category: project.category(),
            metrics,
            entropy,
            vsm,
            ostrom,
            prediction,
            prediction_source,
        })
    }

    /// Analyzes a loaded dataset. Entries rejected while loading appear in
    /// [`BatchReport::failures`] next to projects that failed analysis.
    pub fn analyze_dataset(&self, dataset: &Dataset) -> Result<BatchReport> {
        let mut report = self.analyze(&dataset.projects)?;
        report.failures.extend(dataset.rejected.iter().cloned());
        report.failures.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(report)
    }

    /// Analyzes every project in parallel. A failing project is recorded in
    /// [`BatchReport::failures`] and does not stop the others. Both lists
    /// are sorted by project id.
    pub fn analyze(&self, projects: &[GovernanceProject]) -> Result<BatchReport> {
        let run = || {
            projects
                .par_iter()
                .map(|project| (project.id(), self.analyze_project(project)))
                .collect::<Vec<_>>()
        };
        let outcomes = match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    GovernanceError::Configuration(format!("batch thread pool: {e}"))
                })?
                .install(run),
            None => run(),
        };

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(project = id, kind = e.kind(), "project analysis failed: {e}");
                    failures.push(ProjectFailure {
                        id: id.to_string(),
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        reports.sort_by(|a, b| a.id.cmp(&b.id));
        failures.sort_by(|a, b| a.id.cmp(&b.id));

        info!(
            analyzed = reports.len(),
            failed = failures.len(),
            "batch analysis complete"
        );
        Ok(BatchReport {
            generated_at: chrono::Utc::now(),
            projects: reports,
            failures,
        })
    }
}
