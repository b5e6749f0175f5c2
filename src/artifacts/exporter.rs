use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::analysis::metrics::{format_amount, KeyMetrics};
use crate::error::{Error, Result};
use crate::models::{AnalysisReport, ReportOutcome, SectionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
    Text,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(Error::InvalidRequest(format!("Unsupported format: {}", other))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export(&self, report: &AnalysisReport, format: ExportFormat) -> Result<String> {
        if !report.is_complete() {
            return Err(Error::ReportUnusable {
                request_id: report.request_id(),
                reason: "only complete reports can be exported".to_string(),
            });
        }

        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ExportFormat::Markdown => Ok(format_markdown(report)),
            ExportFormat::Text => Ok(format_text(report)),
        }
    }
}

fn format_markdown(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("# Startup Analysis Report\n\n");
    output.push_str(&format!("> {}\n\n", report.idea().replace('\n', "\n> ")));
    output.push_str(&format!(
        "*Generated on {} · Analysis `{}`*\n\n",
        report.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
        report.request_id()
    ));

    match report.outcome() {
        ReportOutcome::Complete => {}
        ReportOutcome::PartialFailure { failed } => {
            let names = failed.iter().map(|d| d.title()).collect::<Vec<_>>().join(", ");
            output.push_str(&format!(
                "**Warning:** {} of {} sections failed: {}.\n\n",
                failed.len(),
                report.sections().len(),
                names
            ));
        }
        ReportOutcome::TotalFailure => {
            output.push_str("**Warning:** every requested section failed.\n\n");
        }
    }

    let metrics = KeyMetrics::from_report(report);
    if !metrics.is_empty() {
        output.push_str("## Key Findings\n\n");
        output.push_str("| Metric | Value |\n|--------|-------|\n");
        for (label, value) in metric_rows(&metrics) {
            output.push_str(&format!("| {} | {} |\n", label, value));
        }
        output.push('\n');
    }

    for section in report.sections() {
        output.push_str(&format!("## {}\n\n", section.dimension.title()));
        match &section.outcome {
            SectionOutcome::Succeeded { content, .. } => {
                output.push_str(content.trim());
                output.push_str(&format!("\n\n*Source: {}*\n\n", section.provider));
            }
            SectionOutcome::Failed { error, .. } => {
                output.push_str(&format!(
                    "**Failed** after {} attempt(s) with {}: {}\n\n",
                    section.attempts, section.provider, error
                ));
            }
        }
    }

    output.push_str("## Recommendations\n\n");
    if report.recommendations().is_empty() {
        output.push_str("_No recommendations: no section succeeded._\n");
    } else {
        for rec in report.recommendations() {
            output.push_str(&format!("- {}\n", rec));
        }
    }

    output.push_str("\n## Next Steps\n\n");
    output.push_str("1. Review and validate key assumptions\n");
    output.push_str("2. Develop detailed implementation plan\n");
    output.push_str("3. Secure necessary resources and funding\n");
    output.push_str("4. Execute go-to-market strategy\n");
    output.push_str("5. Monitor and iterate based on feedback\n");

    output
}

fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("\n=== Startup Analysis ===\n\n");
    output.push_str(&format!("Idea: {}\n", report.idea()));
    output.push_str(&format!("Analysis ID: {}\n", report.request_id()));
    output.push_str(&format!("Outcome: {}\n", report.outcome()));

    let metrics = KeyMetrics::from_report(report);
    if !metrics.is_empty() {
        output.push_str("\nKey Findings:\n");
        for (label, value) in metric_rows(&metrics) {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }

    for section in report.sections() {
        output.push_str(&format!("\n--- {} ---\n", section.dimension.title()));
        match &section.outcome {
            SectionOutcome::Succeeded { content, .. } => {
                output.push_str(content.trim());
                output.push('\n');
            }
            SectionOutcome::Failed { error, .. } => {
                output.push_str(&format!("FAILED ({}): {}\n", section.provider, error));
            }
        }
    }

    if !report.recommendations().is_empty() {
        output.push_str("\nRecommendations:\n");
        for (i, rec) in report.recommendations().iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, rec));
        }
    }

    output.push_str(&format!(
        "\nAnalyzed on: {}\n",
        report.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn metric_rows(metrics: &KeyMetrics) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(size) = metrics.market_size {
        rows.push(("Market Size", format_amount(size)));
    }
    if let Some(level) = metrics.competition_level {
        rows.push(("Competition Level", level.to_string()));
    }
    if let Some(score) = metrics.feasibility_score {
        rows.push(("Feasibility Score", format!("{}%", score)));
    }
    if let Some(level) = metrics.risk_level {
        rows.push(("Risk Level", level.to_string()));
    }
    if let Some(revenue) = metrics.estimated_revenue {
        rows.push(("Estimated Revenue", format_amount(revenue)));
    }
    if let Some(months) = metrics.time_to_market_months {
        rows.push(("Time to Market", format!("{} months", months)));
    }
    rows
}
