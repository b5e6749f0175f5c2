use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dimension::AnalysisDimension;
use crate::error::{Error, Result};

/// A validated request to analyze one startup idea along a set of dimensions.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    request_id: Uuid,
    idea: String,
    dimensions: Vec<AnalysisDimension>,
}

impl AnalysisRequest {
    /// Duplicate dimensions are dropped; the first occurrence keeps its position.
    pub fn new(idea: impl Into<String>, dimensions: &[AnalysisDimension]) -> Result<Self> {
        let idea = idea.into().trim().to_string();
        if idea.is_empty() {
            return Err(Error::InvalidRequest("Startup idea must not be empty".to_string()));
        }

        let mut ordered: Vec<AnalysisDimension> = Vec::with_capacity(dimensions.len());
        for dimension in dimensions {
            if !ordered.contains(dimension) {
                ordered.push(*dimension);
            }
        }
        if ordered.is_empty() {
            return Err(Error::InvalidRequest(
                "At least one analysis dimension must be requested".to_string(),
            ));
        }

        Ok(Self {
            request_id: Uuid::new_v4(),
            idea,
            dimensions: ordered,
        })
    }

    /// A request covering every dimension.
    pub fn full(idea: impl Into<String>) -> Result<Self> {
        Self::new(idea, &AnalysisDimension::ALL)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn dimensions(&self) -> &[AnalysisDimension] {
        &self.dimensions
    }
}

/// Whether the model's answer had recognizable list or heading structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentShape {
    Structured,
    Unstructured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Succeeded {
        content: String,
        shape: ContentShape,
        highlights: Vec<String>,
    },
    Failed {
        error: String,
        transient: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub dimension: AnalysisDimension,
    pub provider: String,
    pub attempts: u32,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

impl SectionResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, SectionOutcome::Succeeded { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            SectionOutcome::Succeeded { content, .. } => Some(content),
            SectionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SectionOutcome::Failed { error, .. } => Some(error),
            SectionOutcome::Succeeded { .. } => None,
        }
    }

    pub fn highlights(&self) -> &[String] {
        match &self.outcome {
            SectionOutcome::Succeeded { highlights, .. } => highlights,
            SectionOutcome::Failed { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportOutcome {
    Complete,
    PartialFailure { failed: Vec<AnalysisDimension> },
    TotalFailure,
}

impl std::fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportOutcome::Complete => write!(f, "complete"),
            ReportOutcome::PartialFailure { failed } => {
                write!(f, "partial failure ({} failed)", failed.len())
            }
            ReportOutcome::TotalFailure => write!(f, "total failure"),
        }
    }
}

/// The assembled result of one analysis request.
///
/// Sections follow the declaration order of the originating request, one per
/// requested dimension. Reports are only built by the orchestrator and are
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    request_id: Uuid,
    idea: String,
    requested: Vec<AnalysisDimension>,
    sections: Vec<SectionResult>,
    recommendations: Vec<String>,
    created_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub(crate) fn assemble(
        request: &AnalysisRequest,
        sections: Vec<SectionResult>,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            request_id: request.request_id(),
            idea: request.idea().to_string(),
            requested: request.dimensions().to_vec(),
            sections,
            recommendations,
            created_at: Utc::now(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn requested(&self) -> &[AnalysisDimension] {
        &self.requested
    }

    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn section(&self, dimension: AnalysisDimension) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.dimension == dimension)
    }

    pub fn successful_sections(&self) -> impl Iterator<Item = &SectionResult> {
        self.sections.iter().filter(|s| s.succeeded())
    }

    pub fn failed_dimensions(&self) -> Vec<AnalysisDimension> {
        self.sections
            .iter()
            .filter(|s| !s.succeeded())
            .map(|s| s.dimension)
            .collect()
    }

    /// True when every requested dimension resolved to exactly one section,
    /// in declaration order, and nothing else is present.
    pub fn is_complete(&self) -> bool {
        self.sections.len() == self.requested.len()
            && self
                .sections
                .iter()
                .zip(&self.requested)
                .all(|(section, dimension)| section.dimension == *dimension)
    }

    pub fn outcome(&self) -> ReportOutcome {
        let failed = self.failed_dimensions();
        if failed.is_empty() {
            ReportOutcome::Complete
        } else if failed.len() == self.sections.len() {
            ReportOutcome::TotalFailure
        } else {
            ReportOutcome::PartialFailure { failed }
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let succeeded = self.successful_sections().count();
        ReportSummary {
            request_id: self.request_id,
            idea_preview: preview(&self.idea, 80),
            created_at: self.created_at,
            dimensions: self.requested.clone(),
            succeeded,
            failed: self.sections.len() - succeeded,
            outcome: self.outcome(),
        }
    }
}

/// Listing view of a stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub request_id: Uuid,
    pub idea_preview: String,
    pub created_at: DateTime<Utc>,
    pub dimensions: Vec<AnalysisDimension>,
    pub succeeded: usize,
    pub failed: usize,
    pub outcome: ReportOutcome,
}

fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(dimension: AnalysisDimension) -> SectionResult {
        SectionResult {
            dimension,
            provider: "Mock".to_string(),
            attempts: 1,
            outcome: SectionOutcome::Succeeded {
                content: "- a point".to_string(),
                shape: ContentShape::Structured,
                highlights: vec!["a point".to_string()],
            },
        }
    }

    fn failed(dimension: AnalysisDimension) -> SectionResult {
        SectionResult {
            dimension,
            provider: "Mock".to_string(),
            attempts: 1,
            outcome: SectionOutcome::Failed {
                error: "boom".to_string(),
                transient: false,
            },
        }
    }

    #[test]
    fn test_request_rejects_empty_input() {
        assert!(matches!(
            AnalysisRequest::new("   ", &AnalysisDimension::ALL),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            AnalysisRequest::new("A marketplace for bikes", &[]),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_request_dedups_and_keeps_order() {
        use AnalysisDimension::*;
        let request =
            AnalysisRequest::new("idea", &[RiskAssessment, MarketResearch, RiskAssessment])
                .unwrap();
        assert_eq!(request.dimensions(), &[RiskAssessment, MarketResearch]);
    }

    #[test]
    fn test_outcome_classification() {
        use AnalysisDimension::*;
        let request = AnalysisRequest::new("idea", &[MarketResearch, BusinessModel]).unwrap();

        let report = AnalysisReport::assemble(
            &request,
            vec![ok(MarketResearch), ok(BusinessModel)],
            vec![],
        );
        assert_eq!(report.outcome(), ReportOutcome::Complete);
        assert!(report.is_complete());

        let report = AnalysisReport::assemble(
            &request,
            vec![ok(MarketResearch), failed(BusinessModel)],
            vec![],
        );
        assert_eq!(
            report.outcome(),
            ReportOutcome::PartialFailure { failed: vec![BusinessModel] }
        );

        let report = AnalysisReport::assemble(
            &request,
            vec![failed(MarketResearch), failed(BusinessModel)],
            vec![],
        );
        assert_eq!(report.outcome(), ReportOutcome::TotalFailure);
    }

    #[test]
    fn test_incomplete_when_section_missing() {
        use AnalysisDimension::*;
        let request = AnalysisRequest::new("idea", &[MarketResearch, BusinessModel]).unwrap();
        let report = AnalysisReport::assemble(&request, vec![ok(MarketResearch)], vec![]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_section_status_serializes_flat() {
        let json = serde_json::to_value(failed(AnalysisDimension::GoToMarket)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["dimension"], "go_to_market");
        assert_eq!(json["error"], "boom");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_summary_preview_truncates() {
        let long_idea = "x".repeat(200);
        let request = AnalysisRequest::new(long_idea, &[AnalysisDimension::MarketResearch]).unwrap();
        let report =
            AnalysisReport::assemble(&request, vec![ok(AnalysisDimension::MarketResearch)], vec![]);
        let summary = report.summary();
        assert!(summary.idea_preview.ends_with("..."));
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
    }
}
