use clap::{Args, Parser, Subcommand, ValueEnum};
use govmetrics::stats::MetricKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "govmetrics",
    version,
    about = "Open-source governance metrics, archetype classification and VSM health scoring"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory holding govmetrics.toml and .govmetrics/local.toml
    #[arg(long, global = true, default_value = ".")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute contribution metrics for a list of counts
    Metrics(MetricsCommand),
    /// Analyze every project in a dataset
    Analyze(AnalyzeCommand),
    /// Train the archetype classifier on labeled projects
    Train(TrainCommand),
    /// Compare one metric across the labeled archetypes
    Compare(CompareCommand),
}

#[derive(Args)]
pub struct MetricsCommand {
    /// Per-contributor contribution counts
    #[arg(required = true, allow_negative_numbers = true)]
    pub counts: Vec<f64>,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct AnalyzeCommand {
    /// JSON array of projects
    pub dataset: PathBuf,
    /// Trained model file; the threshold heuristic is used without one
    #[arg(long)]
    pub model: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct TrainCommand {
    pub dataset: PathBuf,
    /// Where to write the trained model as JSON
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Cross-validation folds; overrides classifier.folds
    #[arg(long)]
    pub folds: Option<usize>,
    #[arg(long)]
    pub skip_validation: bool,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct CompareCommand {
    pub dataset: PathBuf,
    #[arg(long, value_enum, default_value = "normalized-entropy")]
    pub metric: MetricArg,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Entropy,
    NormalizedEntropy,
    Gini,
    BusFactor,
    Top1Percentage,
    Top5Percentage,
}

impl From<MetricArg> for MetricKind {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Entropy => MetricKind::Entropy,
            MetricArg::NormalizedEntropy => MetricKind::NormalizedEntropy,
            MetricArg::Gini => MetricKind::Gini,
            MetricArg::BusFactor => MetricKind::BusFactor,
            MetricArg::Top1Percentage => MetricKind::Top1Percentage,
            MetricArg::Top5Percentage => MetricKind::Top5Percentage,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
