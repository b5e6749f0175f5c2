use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{AnalysisReport, PitchDeck, SectionResult, Slide, SlideKind};

const MAX_BODY_CHARS: usize = 600;

/// Composes a five-slide deck from a finished report without calling a provider.
#[derive(Debug, Clone, Default)]
pub struct PitchDeckGenerator;

impl PitchDeckGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, report: &AnalysisReport) -> Result<PitchDeck> {
        if !report.is_complete() {
            return Err(Error::ReportUnusable {
                request_id: report.request_id(),
                reason: "the report has unresolved sections".to_string(),
            });
        }
        if report.successful_sections().next().is_none() {
            return Err(Error::ReportUnusable {
                request_id: report.request_id(),
                reason: "every analysis dimension failed".to_string(),
            });
        }

        let slides = SlideKind::SEQUENCE
            .iter()
            .map(|kind| self.compose_slide(*kind, report))
            .collect::<Vec<_>>();

        let deck = PitchDeck {
            request_id: report.request_id(),
            slides,
            generated_at: Utc::now(),
        };
        tracing::info!(
            "Generated pitch deck for {} ({} placeholder slide(s))",
            report.request_id(),
            deck.placeholder_count()
        );
        Ok(deck)
    }

    fn compose_slide(&self, kind: SlideKind, report: &AnalysisReport) -> Slide {
        let source = kind.source();
        let (body, placeholder) = match report.section(source) {
            Some(section) if section.succeeded() => (section_body(section), false),
            Some(section) => (
                format!(
                    "_{} unavailable: the {} analysis failed ({})._",
                    kind.title(),
                    source.title(),
                    section.error().unwrap_or("unknown error")
                ),
                true,
            ),
            None => (
                format!(
                    "_{} not covered: {} was not part of this analysis._",
                    kind.title(),
                    source.title()
                ),
                true,
            ),
        };

        let body = if kind == SlideKind::Solution {
            format!("**{}**\n\n{}", report.idea(), body)
        } else {
            body
        };

        Slide {
            kind,
            title: kind.title().to_string(),
            source,
            body,
            placeholder,
        }
    }
}

fn section_body(section: &SectionResult) -> String {
    if !section.highlights().is_empty() {
        return section
            .highlights()
            .iter()
            .map(|h| format!("- {}", h))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let content = section.content().unwrap_or_default().trim();
    if content.chars().count() > MAX_BODY_CHARS {
        let cut: String = content.chars().take(MAX_BODY_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        content.to_string()
    }
}
