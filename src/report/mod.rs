pub mod json;
pub mod md;

use crate::error::{GovernanceError, Result};
use md::ToMarkdown;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render<R>(report: &R, format: OutputFormat) -> Result<String>
where
    R: Serialize + ToMarkdown,
{
    match format {
        OutputFormat::Json => json::to_json(report).map_err(GovernanceError::Json),
        OutputFormat::Md => Ok(report.to_markdown()),
    }
}
