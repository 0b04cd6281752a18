mod cli;

use clap::Parser;
use govmetrics::batch::{labeled_examples, labeled_metrics, load_projects, BatchAnalyzer};
use govmetrics::classify::{cross_validate, LogisticModel};
use govmetrics::config;
use govmetrics::error::Result;
use govmetrics::metrics::MetricsRecord;
use govmetrics::report::{self, OutputFormat};
use govmetrics::stats::compare_categories;
use govmetrics::types::config::GovConfig;
use govmetrics::types::project::CategoryLabel;
use govmetrics::types::report::TrainingReport;
use govmetrics::vsm::VsmScorer;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const PARTIAL_FAILURE: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn output_format(format: cli::ReportFormat) -> OutputFormat {
    match format {
        cli::ReportFormat::Json => OutputFormat::Json,
        cli::ReportFormat::Md => OutputFormat::Md,
    }
}

fn load_settings(dir: &Path) -> Result<GovConfig> {
    match config::load_config(dir)? {
        Some(cfg) => Ok(cfg),
        None => {
            info!(dir = %dir.display(), "no govmetrics.toml found, using defaults");
            Ok(GovConfig::default())
        }
    }
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Metrics(cmd) => {
            let record = MetricsRecord::from_counts(&cmd.counts)?;
            println!("{}", report::render(&record, output_format(cmd.format))?);
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Analyze(cmd) => {
            let settings = load_settings(&cli.config)?;
            let dataset = load_projects(&cmd.dataset)?;

            let mut analyzer = BatchAnalyzer::new(
                VsmScorer::new(settings.vsm_weights()?),
                settings.ostrom_table()?,
            )
            .with_threads(settings.threads());
            if let Some(path) = &cmd.model {
                let model = LogisticModel::from_json(&std::fs::read_to_string(path)?)?;
                analyzer = analyzer.with_model(model);
            }

            let batch = analyzer.analyze_dataset(&dataset)?;
            println!("{}", report::render(&batch, output_format(cmd.format))?);

            if batch.failures.is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                warn!(
                    failed = batch.failures.len(),
                    "some projects could not be analyzed"
                );
                Ok(exit_code::PARTIAL_FAILURE)
            }
        }
        cli::Commands::Train(cmd) => {
            let settings = load_settings(&cli.config)?;
            let params = settings.training_params();
            let dataset = load_projects(&cmd.dataset)?;
            let examples = labeled_examples(&dataset.projects)?;

            let model = LogisticModel::train(&examples, &params)?;
            let mut correct = 0;
            for example in &examples {
                if model.classify(&example.features)?.label == example.label {
                    correct += 1;
                }
            }

            let cross_validation = if cmd.skip_validation {
                None
            } else {
                let folds = cmd.folds.unwrap_or_else(|| settings.folds());
                Some(cross_validate(&examples, folds, &params)?)
            };

            let model_path = match &cmd.out {
                Some(path) => {
                    std::fs::write(path, serde_json::to_string_pretty(&model)?)?;
                    info!(path = %path.display(), "model written");
                    Some(path.display().to_string())
                }
                None => None,
            };

            let training = TrainingReport {
                trained_at: chrono::Utc::now(),
                examples: examples.len(),
                class_counts: CategoryLabel::ALL
                    .iter()
                    .map(|label| {
                        let count = examples.iter().filter(|e| e.label == *label).count();
                        (*label, count)
                    })
                    .collect(),
                params,
                training_accuracy: correct as f64 / examples.len() as f64,
                cross_validation,
                feature_importance: model.feature_importance(),
                model_path,
            };
            println!("{}", report::render(&training, output_format(cmd.format))?);
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Compare(cmd) => {
            let dataset = load_projects(&cmd.dataset)?;
            let samples = labeled_metrics(&dataset.projects)?;
            let comparison = compare_categories(&samples, cmd.metric.into())?;
            println!("{}", report::render(&comparison, output_format(cmd.format))?);
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}: {}", e.kind(), e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
