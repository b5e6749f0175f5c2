use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::dimension::AnalysisDimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Problem,
    Solution,
    Market,
    BusinessModel,
    Ask,
}

impl SlideKind {
    pub const SEQUENCE: [SlideKind; 5] = [
        SlideKind::Problem,
        SlideKind::Solution,
        SlideKind::Market,
        SlideKind::BusinessModel,
        SlideKind::Ask,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SlideKind::Problem => "Problem",
            SlideKind::Solution => "Solution",
            SlideKind::Market => "Market Opportunity",
            SlideKind::BusinessModel => "Business Model",
            SlideKind::Ask => "The Ask",
        }
    }

    pub fn source(&self) -> AnalysisDimension {
        match self {
            SlideKind::Problem => AnalysisDimension::CustomerAnalysis,
            SlideKind::Solution => AnalysisDimension::TechnicalFeasibility,
            SlideKind::Market => AnalysisDimension::MarketResearch,
            SlideKind::BusinessModel => AnalysisDimension::BusinessModel,
            SlideKind::Ask => AnalysisDimension::FinancialProjections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub kind: SlideKind,
    pub title: String,
    pub source: AnalysisDimension,
    pub body: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchDeck {
    pub request_id: Uuid,
    pub slides: Vec<Slide>,
    pub generated_at: DateTime<Utc>,
}

impl PitchDeck {
    pub fn placeholder_count(&self) -> usize {
        self.slides.iter().filter(|s| s.placeholder).count()
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        for (i, slide) in self.slides.iter().enumerate() {
            output.push_str(&format!("## {}. {}\n\n", i + 1, slide.title));
            output.push_str(&slide.body);
            output.push_str("\n\n");
        }
        output
    }
}

/// A business model to critique. Unknown fields are kept and forwarded to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessModelDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customer_segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revenue_streams: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cost_structure: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_partners: Vec<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl BusinessModelDescription {
    pub fn is_empty(&self) -> bool {
        self.value_proposition
            .as_deref()
            .map(|v| v.trim().is_empty())
            .unwrap_or(true)
            && self.customer_segments.is_empty()
            && self.revenue_streams.is_empty()
            && self.cost_structure.is_empty()
            && self.channels.is_empty()
            && self.key_partners.is_empty()
            && self.other.values().all(|v| v.is_null())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Feasible,
    NotFeasible,
    Undetermined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub critique: String,
    pub verdict: Verdict,
    pub feasible: bool,
    pub provider: String,
    pub validated_at: DateTime<Utc>,
}
