use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// One axis of startup analysis. Variants are listed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDimension {
    MarketResearch,
    CustomerAnalysis,
    BusinessModel,
    TechnicalFeasibility,
    FinancialProjections,
    GoToMarket,
    RiskAssessment,
}

impl AnalysisDimension {
    pub const ALL: [AnalysisDimension; 7] = [
        AnalysisDimension::MarketResearch,
        AnalysisDimension::CustomerAnalysis,
        AnalysisDimension::BusinessModel,
        AnalysisDimension::TechnicalFeasibility,
        AnalysisDimension::FinancialProjections,
        AnalysisDimension::GoToMarket,
        AnalysisDimension::RiskAssessment,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AnalysisDimension::MarketResearch => "market_research",
            AnalysisDimension::CustomerAnalysis => "customer_analysis",
            AnalysisDimension::BusinessModel => "business_model",
            AnalysisDimension::TechnicalFeasibility => "technical_feasibility",
            AnalysisDimension::FinancialProjections => "financial_projections",
            AnalysisDimension::GoToMarket => "go_to_market",
            AnalysisDimension::RiskAssessment => "risk_assessment",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisDimension::MarketResearch => "Market Research",
            AnalysisDimension::CustomerAnalysis => "Customer Analysis",
            AnalysisDimension::BusinessModel => "Business Model",
            AnalysisDimension::TechnicalFeasibility => "Technical Feasibility",
            AnalysisDimension::FinancialProjections => "Financial Projections",
            AnalysisDimension::GoToMarket => "Go-to-Market Strategy",
            AnalysisDimension::RiskAssessment => "Risk Assessment",
        }
    }

    /// The analyst task handed to the model for this dimension.
    pub fn task(&self) -> &'static str {
        match self {
            AnalysisDimension::MarketResearch => {
                "Analyze market size, trends, and competitive landscape"
            }
            AnalysisDimension::CustomerAnalysis => {
                "Define target customers and their pain points"
            }
            AnalysisDimension::BusinessModel => {
                "Design comprehensive business model and revenue streams"
            }
            AnalysisDimension::TechnicalFeasibility => {
                "Evaluate technical requirements and feasibility"
            }
            AnalysisDimension::FinancialProjections => {
                "Create financial projections and funding requirements"
            }
            AnalysisDimension::GoToMarket => "Develop go-to-market strategy and launch plan",
            AnalysisDimension::RiskAssessment => {
                "Identify potential risks and mitigation strategies"
            }
        }
    }

    /// Parses a comma separated list such as `market_research,risk_assessment`.
    /// `all` expands to every dimension.
    pub fn parse_list(input: &str) -> Result<Vec<AnalysisDimension>> {
        let mut dimensions = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                dimensions.extend(Self::ALL);
            } else {
                dimensions.push(part.parse()?);
            }
        }
        Ok(dimensions)
    }
}

impl std::fmt::Display for AnalysisDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for AnalysisDimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|d| d.key() == normalized)
            .ok_or_else(|| Error::InvalidRequest(format!("Unknown analysis dimension: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension_aliases() {
        assert_eq!(
            "market-research".parse::<AnalysisDimension>().unwrap(),
            AnalysisDimension::MarketResearch
        );
        assert_eq!(
            "Go To Market".parse::<AnalysisDimension>().unwrap(),
            AnalysisDimension::GoToMarket
        );
        assert!("pricing".parse::<AnalysisDimension>().is_err());
    }

    #[test]
    fn test_parse_list_expands_all() {
        let dims = AnalysisDimension::parse_list("all").unwrap();
        assert_eq!(dims, AnalysisDimension::ALL.to_vec());

        let dims = AnalysisDimension::parse_list("risk_assessment, market_research").unwrap();
        assert_eq!(
            dims,
            vec![AnalysisDimension::RiskAssessment, AnalysisDimension::MarketResearch]
        );
    }
}
