use crate::llm::prompts::{VERDICT_FEASIBLE, VERDICT_NOT_FEASIBLE};
use crate::models::{ContentShape, Verdict};

/// Upper bound on highlights kept per section.
pub const MAX_HIGHLIGHTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSection {
    pub shape: ContentShape,
    pub highlights: Vec<String>,
}

/// Extracts key lines from a model answer.
///
/// Bullets under a "takeaways" heading win, then any bullet or numbered
/// line. Text with neither falls back to its first plain lines and is
/// marked unstructured.
pub fn parse_section(text: &str) -> ParsedSection {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let takeaways = takeaway_bullets(&lines);
    if !takeaways.is_empty() {
        return ParsedSection {
            shape: ContentShape::Structured,
            highlights: takeaways,
        };
    }

    let bullets: Vec<String> = lines
        .iter()
        .filter_map(|line| list_item(line))
        .filter(|item| !item.is_empty())
        .take(MAX_HIGHLIGHTS)
        .collect();
    if !bullets.is_empty() {
        return ParsedSection {
            shape: ContentShape::Structured,
            highlights: bullets,
        };
    }

    let has_headings = lines.iter().any(|line| heading(line).is_some());
    let plain: Vec<String> = lines
        .iter()
        .filter(|line| !line.is_empty() && heading(line).is_none())
        .map(|line| strip_emphasis(line))
        .filter(|line| !line.is_empty())
        .take(MAX_HIGHLIGHTS)
        .collect();

    ParsedSection {
        shape: if has_headings {
            ContentShape::Structured
        } else {
            ContentShape::Unstructured
        },
        highlights: plain,
    }
}

fn takeaway_bullets(lines: &[&str]) -> Vec<String> {
    let Some(start) = lines.iter().position(|line| {
        heading(line)
            .map(|h| h.to_lowercase().contains("takeaway"))
            .unwrap_or(false)
    }) else {
        return Vec::new();
    };

    lines[start + 1..]
        .iter()
        .take_while(|line| heading(line).is_none())
        .filter_map(|line| list_item(line))
        .filter(|item| !item.is_empty())
        .take(MAX_HIGHLIGHTS)
        .collect()
}

/// Returns the heading text for markdown headings (`## x`) and bold-only lines (`**x**`).
fn heading(line: &str) -> Option<String> {
    if line.starts_with('#') {
        let text = line.trim_start_matches('#').trim();
        return (!text.is_empty()).then(|| strip_emphasis(text));
    }
    let stripped = line.trim_end_matches(':');
    if stripped.len() > 4 && stripped.starts_with("**") && stripped.ends_with("**") {
        let inner = &stripped[2..stripped.len() - 2];
        if !inner.contains("**") {
            return Some(inner.trim().to_string());
        }
    }
    None
}

fn list_item(line: &str) -> Option<String> {
    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(strip_emphasis(rest));
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 3 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(strip_emphasis(rest));
        }
    }
    None
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace('`', "").trim().to_string()
}

/// Reads the verdict line the validation prompt asks for. The last verdict wins.
pub fn parse_verdict(text: &str) -> Verdict {
    text.lines()
        .rev()
        .map(|line| strip_emphasis(line).to_uppercase())
        .find_map(|line| {
            if line.contains(VERDICT_NOT_FEASIBLE) {
                Some(Verdict::NotFeasible)
            } else if line.contains(VERDICT_FEASIBLE) {
                Some(Verdict::Feasible)
            } else {
                None
            }
        })
        .unwrap_or(Verdict::Undetermined)
}
