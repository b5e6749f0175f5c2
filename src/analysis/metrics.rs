use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Low => write!(f, "Low"),
            Level::Medium => write!(f, "Medium"),
            Level::High => write!(f, "High"),
        }
    }
}

/// Headline figures scraped from the analysis text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub market_size: Option<f64>,
    pub competition_level: Option<Level>,
    pub feasibility_score: Option<u8>,
    pub risk_level: Option<Level>,
    pub estimated_revenue: Option<f64>,
    pub time_to_market_months: Option<u32>,
}

impl KeyMetrics {
    /// Scans the successful sections of a report in section order.
    pub fn from_report(report: &AnalysisReport) -> Self {
        let text = report
            .successful_sections()
            .filter_map(|s| s.content())
            .collect::<Vec<_>>()
            .join("\n");
        extract_key_metrics(&text)
    }

    pub fn is_empty(&self) -> bool {
        *self == KeyMetrics::default()
    }
}

struct Patterns {
    market: Vec<Regex>,
    feasibility: Vec<Regex>,
    revenue: Vec<Regex>,
    time_to_market: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |sources: &[&str]| -> Vec<Regex> {
            sources
                .iter()
                .filter_map(|source| Regex::new(&format!("(?i){}", source)).ok())
                .collect()
        };
        Patterns {
            market: compile(&[
                r"market size[:\s]*\$?([\d,]+\.?\d*)\s*(billion|million|thousand|trillion)",
                r"\$?([\d,]+\.?\d*)\s*(billion|million|thousand|trillion)\s*market",
                r"market.*\$?([\d,]+\.?\d*)\s*(billion|million|thousand|trillion)",
            ]),
            feasibility: compile(&[
                r"feasibility.*?(\d{1,2})%",
                r"(\d{1,2})%.*?feasibility",
                r"feasibility.*?(\d{1,2})\s*out\s*of\s*100",
            ]),
            revenue: compile(&[
                r"revenue.*?\$?([\d,]+\.?\d*)\s*(billion|million|thousand)",
                r"\$?([\d,]+\.?\d*)\s*(billion|million|thousand).*?revenue",
                r"projected.*?\$?([\d,]+\.?\d*)\s*(billion|million|thousand)",
            ]),
            time_to_market: compile(&[
                r"(\d+)\s*(months?|years?)\s*to\s*market",
                r"time\s*to\s*market.*?(\d+)\s*(months?|years?)",
                r"launch.*?(\d+)\s*(months?|years?)",
            ]),
        }
    })
}

const COMPETITION_KEYWORDS: [(Level, &[&str]); 3] = [
    (Level::Low, &["low competition", "few competitors", "niche market", "blue ocean"]),
    (Level::Medium, &["moderate competition", "some competitors", "competitive market"]),
    (Level::High, &["high competition", "many competitors", "saturated market", "red ocean"]),
];

const RISK_KEYWORDS: [(Level, &[&str]); 3] = [
    (Level::Low, &["low risk", "minimal risk", "safe investment"]),
    (Level::Medium, &["medium risk", "moderate risk", "balanced risk"]),
    (Level::High, &["high risk", "significant risk", "risky venture"]),
];

pub fn extract_key_metrics(text: &str) -> KeyMetrics {
    let patterns = patterns();
    let lowered = text.to_lowercase();

    KeyMetrics {
        market_size: first_amount(&patterns.market, text),
        competition_level: keyword_level(&COMPETITION_KEYWORDS, &lowered),
        feasibility_score: patterns.feasibility.iter().find_map(|re| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        }),
        risk_level: keyword_level(&RISK_KEYWORDS, &lowered),
        estimated_revenue: first_amount(&patterns.revenue, text),
        time_to_market_months: patterns.time_to_market.iter().find_map(|re| {
            let caps = re.captures(text)?;
            let value: u32 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            if unit.starts_with("year") {
                value.checked_mul(12)
            } else {
                Some(value)
            }
        }),
    }
}

fn first_amount(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let value: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
        let multiplier = match caps.get(2)?.as_str().to_lowercase().as_str() {
            "trillion" => 1e12,
            "billion" => 1e9,
            "million" => 1e6,
            _ => 1e3,
        };
        Some(value * multiplier)
    })
}

fn keyword_level(table: &[(Level, &[&str])], lowered: &str) -> Option<Level> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(level, _)| *level)
}

/// Renders an amount like `$2.5B`.
pub fn format_amount(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.1}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${:.0}", value)
    }
}
